//! The router maps control sequences and active characters to their current meaning.
//!
//! Meanings are [Route]s. Routes are copied by `\let`, so after `\let\a=\b`
//! the two commands share a meaning but redefining one does not change the other.
//! Macro routes share their body, which is freed once no route refers to it.

use crate::font::FontId;
use crate::primitive::Primitive;
use crate::state::parameters::Parameter;
use crate::state::registers::RegisterKind;
use crate::texmacro::Macro;
use crate::token::{CommandRef, CsNameInterner, Frozen, Value};
use std::rc::Rc;
use texfront_stdext::algorithms::spellcheck;
use texfront_stdext::collections::groupingmap::{GroupingHashMap, NoGroupToEndError, Scope};

/// The meaning of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Primitive(Primitive),
    Macro(Rc<Macro>),
    /// A command that behaves like a character, as produced by `\let\a=b`.
    Character(Value),
    /// A `\chardef` constant.
    CharCode(u32),
    Register(RegisterKind, usize),
    Parameter(Parameter),
    Font(FontId),
}

#[derive(Debug, Default)]
pub struct Router {
    routes: GroupingHashMap<CommandRef, Route>,
}

impl Router {
    /// Builds a router with every primitive and parameter installed under its name.
    pub fn new(interner: &mut CsNameInterner) -> Router {
        let mut router = Router::default();
        let routes = Primitive::ALL
            .iter()
            .map(|p| (p.name(), Route::Primitive(*p)))
            .chain(Parameter::all().map(|p| (p.name(), Route::Parameter(p))));
        for (name, route) in routes {
            if let Some(cs_name) = interner.get_or_intern(name) {
                router
                    .routes
                    .insert(CommandRef::ControlSequence(cs_name), route, Scope::Global);
            }
        }
        router
    }

    /// Returns the current meaning of a command, or [None] if it is undefined.
    pub fn lookup(&self, command_ref: CommandRef) -> Option<Route> {
        match command_ref {
            CommandRef::Frozen(Frozen::Relax) => Some(Route::Primitive(Primitive::Relax)),
            CommandRef::Frozen(Frozen::EndTemplate) => None,
            _ => self.routes.get(&command_ref).cloned(),
        }
    }

    /// Defines a macro.
    pub fn define_macro(&mut self, name: CommandRef, definition: Rc<Macro>, scope: Scope) {
        self.routes.insert(name, Route::Macro(definition), scope);
    }

    /// Gives a command a meaning. Used by `\let` and the short hand definitions.
    pub fn set_route(&mut self, name: CommandRef, route: Route, scope: Scope) {
        self.routes.insert(name, route, scope);
    }

    /// Names of defined control sequences that are close to the provided name.
    pub fn close_names(&self, name: &str, interner: &CsNameInterner) -> Vec<String> {
        let defined = self
            .routes
            .keys()
            .filter_map(|command_ref| match command_ref {
                CommandRef::ControlSequence(cs_name) => interner.resolve(*cs_name),
                _ => None,
            });
        spellcheck::find_close_words(defined, name, 2, 3)
            .into_iter()
            .map(|diff| format!["\\{}", diff.word])
            .collect()
    }

    pub fn begin_group(&mut self) {
        self.routes.begin_group();
    }

    pub fn end_group(&mut self) -> Result<(), NoGroupToEndError> {
        self.routes.end_group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texmacro::Replacement;
    use crate::token::{trace, Token};

    fn body(c: char) -> Rc<Macro> {
        Rc::new(Macro::new(
            vec![],
            vec![],
            vec![Replacement::Tokens(vec![Token::new_letter(c, trace::Key::dummy())])],
        ))
    }

    fn cs(interner: &mut CsNameInterner, name: &str) -> CommandRef {
        CommandRef::ControlSequence(interner.get_or_intern(name).unwrap())
    }

    #[test]
    fn primitives_are_installed() {
        let mut interner = CsNameInterner::default();
        let router = Router::new(&mut interner);
        let relax = cs(&mut interner, "relax");
        assert_eq!(router.lookup(relax), Some(Route::Primitive(Primitive::Relax)));
        let foo = cs(&mut interner, "foo");
        assert_eq!(router.lookup(foo), None);
    }

    #[test]
    fn frozen_relax_cannot_be_redefined() {
        let mut interner = CsNameInterner::default();
        let mut router = Router::new(&mut interner);
        let relax = cs(&mut interner, "relax");
        router.define_macro(relax, body('a'), Scope::Global);
        assert_eq!(
            router.lookup(CommandRef::Frozen(Frozen::Relax)),
            Some(Route::Primitive(Primitive::Relax))
        );
    }

    #[test]
    fn let_copies_the_route() {
        let mut interner = CsNameInterner::default();
        let mut router = Router::new(&mut interner);
        let a = cs(&mut interner, "a");
        let b = cs(&mut interner, "b");
        router.define_macro(b, body('x'), Scope::Local);
        let route = router.lookup(b).unwrap();
        router.set_route(a, route, Scope::Local);
        router.define_macro(b, body('y'), Scope::Local);
        let Some(Route::Macro(m)) = router.lookup(a) else {
            panic!("expected a macro");
        };
        assert_eq!(m, body('x'));
    }

    #[test]
    fn replaced_definitions_are_freed() {
        let mut interner = CsNameInterner::default();
        let mut router = Router::new(&mut interner);
        let a = cs(&mut interner, "a");
        let first = body('x');
        router.define_macro(a, first.clone(), Scope::Local);
        assert_eq!(Rc::strong_count(&first), 2);
        for _ in 0..1000 {
            router.define_macro(a, body('y'), Scope::Local);
        }
        assert_eq!(Rc::strong_count(&first), 1);

        let inner = body('z');
        router.begin_group();
        router.define_macro(a, inner.clone(), Scope::Local);
        router.define_macro(a, inner.clone(), Scope::Local);
        assert_eq!(Rc::strong_count(&inner), 2);
        router.end_group().unwrap();
        assert_eq!(Rc::strong_count(&inner), 1);
        assert_eq!(router.lookup(a), Some(Route::Macro(body('y'))));
    }

    #[test]
    fn local_definition_is_undone() {
        let mut interner = CsNameInterner::default();
        let mut router = Router::new(&mut interner);
        let a = cs(&mut interner, "a");
        router.begin_group();
        router.define_macro(a, body('x'), Scope::Local);
        assert!(router.lookup(a).is_some());
        router.end_group().unwrap();
        assert_eq!(router.lookup(a), None);
    }

    #[test]
    fn close_names() {
        let mut interner = CsNameInterner::default();
        let router = Router::new(&mut interner);
        let got = router.close_names("rellax", &interner);
        assert_eq!(got.first().map(String::as_str), Some("\\relax"));
    }
}
