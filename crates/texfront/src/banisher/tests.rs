use super::*;
use crate::command::Command;
use crate::testing::*;

fn terminal_values(input: &str) -> Vec<Value> {
    let mut b = Banisher::new(Config {
        end_line_char: -1,
        ..Config::plain_tex()
    });
    b.push_source(Origin::Terminal, input);
    let mut values = vec![];
    while let Some(it) = b.next_terminal().unwrap() {
        values.push(it.token.value());
    }
    values
}

expansion_test![macro_arguments_are_positional, r"\def\a#1#2#3{#3#2#1}\a abc", "cba"];
expansion_test![
    macro_argument_used_twice,
    r"\def\a#1{#1#1}\a{xy}",
    "xyxy"
];
expansion_test![
    delimited_argument_braces_are_stripped,
    r"\def\foo#1X{(#1)}\foo{a}X",
    "(a)"
];
expansion_test![
    delimited_argument_without_braces,
    r"\def\foo#1X{(#1)}\foo aX",
    "(a)"
];
expansion_test![
    delimited_argument_braces_are_kept,
    r"\def\foo#1X{(#1)}\foo{a}{b}X",
    "({a}{b})"
];
expansion_test![
    nested_conditionals,
    r"\iftrue\iftrue A\else B\fi\else C\fi",
    "A"
];
expansion_test![iffalse_takes_else_branch, r"\iffalse A\else B\fi", "B"];
expansion_test![iffalse_without_else, r"\iffalse A\fi B", "B"];
expansion_test![
    skipped_branch_with_nested_conditional,
    r"\iffalse \iftrue A\else B\fi \else C\fi",
    "C"
];
expansion_test![ifnum, r"\ifnum 1<2 Y\else N\fi", "Y"];
expansion_test![ifnum_equal, r"\count1=4 \ifnum\count1=4 Y\else N\fi", "Y"];
expansion_test![ifdim, r"\ifdim 1pt>2pt Y\else N\fi", "N"];
expansion_test![ifodd, r"\ifodd 3 Y\else N\fi", "Y"];
expansion_test![ifcase, r"\ifcase 2 a\or b\or c\else d\fi", "c"];
expansion_test![ifcase_zero, r"\ifcase 0 a\or b\fi", "a"];
expansion_test![ifcase_else, r"\ifcase 5 a\or b\else d\fi", "d"];
expansion_test![
    ifx_macros_with_same_definition,
    r"\def\a{x}\def\b{x}\ifx\a\b Y\else N\fi",
    "Y"
];
expansion_test![
    ifx_macros_with_different_definitions,
    r"\def\a{x}\def\b{y}\ifx\a\b Y\else N\fi",
    "N"
];
expansion_test![if_characters, r"\if aa Y\else N\fi", "Y"];
expansion_test![ifcat_letter_and_other, r"\ifcat a1Y\else N\fi", "N"];
expansion_test![ifvmode, r"\ifvmode Y\else N\fi", "Y"];
expansion_test![ifhmode_in_paragraph, r"a\ifhmode Y\else N\fi", "aY"];
expansion_test![ifmmode_is_false, r"\ifmmode Y\else N\fi", "N"];
expansion_test![ifinner_in_box, r"\setbox0\hbox{\ifinner \global\count1=1 \fi}\the\count1", "1"];

expansion_test![
    let_copies_the_current_meaning,
    r"\def\b{1}\let\a=\b \def\b{2}\a",
    "1"
];
expansion_test![let_to_a_character, r"\let\a=x \a", "x"];
expansion_test![
    global_definition_escapes_the_group,
    r"\def\a{1}{\global\def\a{2}}\a",
    "2"
];
expansion_test![local_definition_is_undone, r"\def\a{1}{\def\a{2}}\a", "1"];
expansion_test![gdef, r"{\gdef\a{2}}\a", "2"];
expansion_test![
    group_restores_register,
    r"\count1=5 {\count1=7 }\the\count1",
    "5"
];
expansion_test![
    semi_simple_group_restores_register,
    r"\count1=5 \begingroup\count1=7 \endgroup\the\count1",
    "5"
];
expansion_test![
    box_restores_register,
    r"\count1=5 \setbox0=\hbox{\count1=7 }\the\count1",
    "5"
];
expansion_test![
    group_restores_cat_code,
    r"{\catcode`\A=12 }\ifcat Aa Y\else N\fi",
    "Y"
];
expansion_test![
    globaldefs_makes_assignments_global,
    r"{\globaldefs=1 \count1=3 }\the\count1",
    "3"
];

expansion_test![backtick_constant, r"\number`\A", "65"];
expansion_test![hexadecimal_constant, r#"\number"1F"#, "31"];
expansion_test![octal_constant, r"\number'17", "15"];
expansion_test![number_of_register, r"\count3=-12 \number\count3", "-12"];
expansion_test![the_dimension, r"\dimen0=1.5pt \the\dimen0", "1.5pt"];
expansion_test![the_token_list, r"\toks0={ab}\the\toks0", "ab"];
expansion_test![romannumeral, r"\romannumeral 1984", "mcmlxxxiv"];
expansion_test![romannumeral_of_zero, r"\romannumeral 0 x", "x"];

expansion_test![uppercase, r"\uppercase{aA1}", "AA1"];
expansion_test![lowercase, r"\lowercase{AB}", "ab"];
expansion_test![
    uppercase_does_not_expand_its_argument,
    r"\def\a{b}\uppercase{\a}",
    "b"
];

expansion_test![csname, r"\def\ab{x}\csname ab\endcsname", "x"];
expansion_test![csname_with_macro, r"\def\n{ab}\def\ab{x}\csname\n\endcsname", "x"];
expansion_test![csname_of_undefined_name_is_relax, r"\csname zz\endcsname y", "y"];
expansion_test![
    edef_with_noexpand,
    r"\def\a{x}\edef\b{\a\noexpand\a}\def\a{y}\b",
    "xy"
];
expansion_test![
    edef_with_the,
    r"\count1=7 \edef\b{\the\count1}\count1=8 \b",
    "7"
];
expansion_test![noexpand_is_relax, r"\def\a{x}\noexpand\a y", "y"];
expansion_test![
    futurelet,
    r"\def\b{\ifx\c x Y\else N\fi}\futurelet\c\b x",
    "Yx"
];
expansion_test![string_without_escape_char, r"\escapechar=-1 \string\foo", "foo"];
expansion_test![
    expandafter_expands_the_second_token,
    r"\def\a{b}\expandafter\string\a",
    "b"
];
expansion_test![
    expandafter_with_unexpandable_token,
    r"\expandafter a\iftrue b\fi",
    "ab"
];

expansion_failure_test![undefined_control_sequence, r"\undefined"];
expansion_failure_test![infinite_recursion, r"\def\a{\a}\a"];
expansion_failure_test![extra_fi, r"\fi"];
expansion_failure_test![extra_else, r"\iffalse a\else b\else c\fi"];
expansion_failure_test![extra_or, r"\iftrue a\or b\fi"];
expansion_failure_test![extra_end_group, "}"];
expansion_failure_test![end_group_closes_semi_simple_group, r"\begingroup}"];
expansion_failure_test![endgroup_closes_plain_group, r"{\endgroup"];
expansion_failure_test![csname_with_unexpandable_command, r"\csname a\relax\endcsname"];
expansion_failure_test![unterminated_box, r"\hbox{a"];
expansion_failure_test![let_to_undefined_control_sequence, r"\let\a=\undefined"];

#[test]
fn uppercase_preserves_categories() {
    assert_eq!(
        terminal_values(r"\uppercase{aA1}"),
        vec![Value::Letter('A'), Value::Letter('A'), Value::Other('1')]
    );
}

#[test]
fn string_of_letter() {
    assert_eq!(terminal_values(r"\string a"), vec![Value::Other('a')]);
}

#[test]
fn string_of_control_sequence() {
    assert_eq!(
        terminal_values(r"\string\foo"),
        vec![
            Value::Other('\\'),
            Value::Other('f'),
            Value::Other('o'),
            Value::Other('o')
        ]
    );
}

#[test]
fn macro_call_is_retried_after_more_input() {
    let mut engine = new_engine();
    engine.push_source(Origin::Terminal, r"\def\a#1{(#1)}\a");
    let err = engine.next_command().unwrap_err();
    assert!(err.error.is_end_of_input());
    engine.push_source(Origin::Terminal, "x");
    assert_eq!(
        engine.run().unwrap(),
        vec![
            Command::Character('('),
            Command::Character('x'),
            Command::Character(')')
        ]
    );
}

#[test]
fn incomplete_definition_is_retried_after_more_input() {
    let mut engine = new_engine();
    engine.push_source(Origin::Terminal, r"\def\a{b");
    let err = engine.next_command().unwrap_err();
    assert!(err.error.is_end_of_input());
    engine.push_source(Origin::Terminal, r"}\a");
    assert_eq!(engine.run().unwrap(), vec![Command::Character('b')]);
}

#[test]
fn expansion_counter_resets_after_each_command() {
    let mut input = String::new();
    for _ in 0..50 {
        input.push_str(r"\def\a{\b}\def\b{c}\a");
    }
    let got = run(&input).unwrap();
    assert_eq!(got.len(), 50);
}

#[test]
fn group_depth_is_tracked() {
    let mut b = Banisher::new(Config::plain_tex());
    b.push_source(Origin::Terminal, "{{");
    b.next_terminal().unwrap();
    b.next_terminal().unwrap();
    assert_eq!(b.group_depth(), 2);
}

fn run_with(config: Config, input: &str) -> std::result::Result<Vec<Command>, TracedError> {
    let mut engine = crate::Engine::new(Config {
        end_line_char: -1,
        ..config
    });
    engine.push_source(Origin::Terminal, input);
    engine.run()
}

#[test]
fn chardef_is_usable_right_after_its_definition() {
    assert_eq!(run(r"\chardef\x=65\x").unwrap(), vec![Command::Character('A')]);
}

#[test]
fn font_is_selected_right_after_its_definition() {
    let mut engine = new_engine().with_font_loader(Box::new(crate::font::tests::SquareLoader));
    engine.push_source(Origin::Terminal, r"\font\f=square \f");
    assert_eq!(engine.run().unwrap(), Vec::<Command>::new());
    assert_eq!(engine.state().fonts.current().name, "square");
}

#[test]
fn roman_numeral_is_retried_after_more_input() {
    let mut engine = new_engine();
    engine.push_source(Origin::Terminal, r"\romannumeral");
    let err = engine.next_command().unwrap_err();
    assert!(err.error.is_end_of_input());
    engine.push_source(Origin::Terminal, "12 ");
    assert_eq!(engine.run().unwrap(), run("xii").unwrap());
}

#[test]
fn conditional_is_retried_after_more_input() {
    let mut engine = new_engine();
    engine.push_source(Origin::Terminal, r"\ifnum 1<");
    let err = engine.next_command().unwrap_err();
    assert!(err.error.is_end_of_input());
    engine.push_source(Origin::Terminal, r"2 Y\else N\fi");
    assert_eq!(engine.run().unwrap(), vec![Command::Character('Y')]);
}

#[test]
fn ifx_is_retried_after_more_input() {
    let mut engine = new_engine();
    engine.push_source(Origin::Terminal, r"\ifx a");
    let err = engine.next_command().unwrap_err();
    assert!(err.error.is_end_of_input());
    engine.push_source(Origin::Terminal, r"aY\else N\fi");
    assert_eq!(engine.run().unwrap(), vec![Command::Character('Y')]);
}

#[test]
fn csname_is_retried_after_more_input() {
    let mut engine = new_engine();
    engine.push_source(Origin::Terminal, r"\def\foo{z}\csname fo");
    let err = engine.next_command().unwrap_err();
    assert!(err.error.is_end_of_input());
    engine.push_source(Origin::Terminal, r"o\endcsname");
    assert_eq!(engine.run().unwrap(), vec![Command::Character('z')]);
}

#[test]
fn expandafter_is_retried_after_more_input() {
    let mut engine = new_engine();
    engine.push_source(Origin::Terminal, r"\def\a#1{(#1)}\expandafter\a\romannumeral");
    let err = engine.next_command().unwrap_err();
    assert!(err.error.is_end_of_input());
    engine.push_source(Origin::Terminal, "3 ");
    assert_eq!(engine.run().unwrap(), run("(i)ii").unwrap());
}

#[test]
fn skipped_branch_cut_off_by_the_end_of_input() {
    let mut engine = new_engine();
    engine.push_source(Origin::Terminal, r"\iffalse a");
    let err = engine.next_command().unwrap_err();
    assert!(matches!(*err.error, Error::IncompleteConditional { .. }));
    assert!(!err.error.is_end_of_input());
    // The conditional was abandoned.
    engine.push_source(Origin::Terminal, r"\fi");
    let err = engine.next_command().unwrap_err();
    assert!(matches!(*err.error, Error::ExtraConditionalToken { .. }));
}

expansion_test![
    macros_are_expanded_while_skipping,
    r"\def\a{\else}\iffalse A\a B\fi",
    "B"
];

#[test]
fn macros_are_not_expanded_while_skipping_if_disabled() {
    let config = Config {
        expand_while_skipping: false,
        ..Config::plain_tex()
    };
    assert_eq!(run_with(config, r"\def\a{\else}\iffalse A\a B\fi").unwrap(), Vec::<Command>::new());
}

#[test]
fn csname_of_undefined_name_without_defining_relax() {
    let config = Config {
        csname_defines_relax: false,
        ..Config::plain_tex()
    };
    let err = run_with(config, r"\csname zz\endcsname").unwrap_err();
    assert!(matches!(*err.error, Error::NoSuchControlSequence { .. }));
    assert!(run(r"\csname zz\endcsname").is_ok());
}

#[test]
fn traced_error_names_the_expanded_macro() {
    let config = Config {
        trace_expansions: true,
        ..Config::plain_tex()
    };
    let err = run_with(config, r"\def\a{\undefined}\a").unwrap_err();
    assert!(
        err.notes.iter().any(|note| note.contains("produced by expanding")),
        "notes: {:?}",
        err.notes
    );
    let err = run(r"\def\a{\undefined}\a").unwrap_err();
    assert!(!err.notes.iter().any(|note| note.contains("produced by expanding")));
}

expansion_test![
    global_definition_of_let_name,
    r"\def\b{1}\let\a=\b {\global\def\a{2}}\a",
    "2"
];
expansion_test![
    global_definition_of_let_name_in_nested_groups,
    r"\def\b{1}{\let\a=\b {{\global\def\a{2}}\a}\a}\a\b",
    "2221"
];
expansion_test![
    divide_glue_divides_every_component,
    r"\skip0=10pt plus 4pt minus 2pt\divide\skip0 by 2 \the\skip0",
    r"\skip1=5pt plus 2pt minus 1pt \the\skip1"
];
