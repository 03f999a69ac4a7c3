use std::convert::TryInto;
use std::io;
use std::sync::Arc;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use patternrule::filter::{FilterCall, RuleFilter};
use patternrule::rule::grammar::Match;
use patternrule::rule::pattern::{
    ChunkSpec, ExceptionScope, ExceptionSpec, PatternTokenSpec as P, PredicateSpec,
};
use patternrule::rule::unify::{Unification, UnifierConfig};
use patternrule::tokenizer::{tag::Tagger, Tokenizer};
use patternrule::types::{Sentence, Token};
use patternrule::{
    Error, Language, PatternRule, PatternRuleSpec, RuleMatch, Rules, RulesOptions, Synthesizer,
};
use quickcheck_macros::quickcheck;

lazy_static! {
    static ref LANGUAGE: Arc<Language> = Arc::new(Language::new("en"));
    static ref TOKENIZER: Tokenizer = Tokenizer::default();
    static ref TAGGER: Arc<Tagger> = Arc::new(Tagger::from_entries(vec![
        ("he", "he", "PRP"),
        ("walk", "walk", "VB"),
        ("walks", "walk", "VBZ"),
        ("walked", "walk", "VBD"),
        ("this", "this", "DT:sg"),
        ("these", "this", "DT:pl"),
        ("bike", "bike", "NN:sg"),
        ("bikes", "bike", "NN:pl"),
    ]));
    static ref TAGGED_LANGUAGE: Arc<Language> = {
        let unifier = UnifierConfig::default()
            .with_equivalence("number", "sg", PredicateSpec::pos_regex(".*:sg"))
            .and_then(|x| x.with_equivalence("number", "pl", PredicateSpec::pos_regex(".*:pl")))
            .unwrap();

        Arc::new(Language::new("en").with_tagger(TAGGER.clone()).with_unifier(unifier))
    };
    static ref TAGGED_TOKENIZER: Tokenizer = Tokenizer::new(TAGGER.clone());
}

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rule(tokens: Vec<P>) -> PatternRule {
    PatternRuleSpec::new("TEST_RULE", tokens)
        .compile(LANGUAGE.clone())
        .unwrap()
}

fn sentence_spans(rule: &PatternRule, sentence: &Sentence) -> Vec<(usize, usize)> {
    init();
    rule.apply(sentence)
        .unwrap()
        .iter()
        .map(|x| x.span())
        .collect()
}

fn spans(rule: &PatternRule, text: &str) -> Vec<(usize, usize)> {
    sentence_spans(rule, &TOKENIZER.tokenize(text))
}

fn assert_complete_match(rule: &PatternRule, text: &str) {
    let complete = vec![(0, text.chars().count())];
    assert_eq!(spans(rule, text), complete, "{}", text);
}

fn assert_partial_match(rule: &PatternRule, text: &str) {
    let spans = spans(rule, text);
    assert_eq!(spans.len(), 1, "{}", text);
    assert_ne!(spans[0], (0, text.chars().count()), "{}", text);
}

fn assert_no_match(rule: &PatternRule, text: &str) {
    assert!(spans(rule, text).is_empty(), "{}", text);
}

#[test]
fn finds_literal_sequence() {
    let rule = rule(vec![P::literal("my"), P::literal("test")]);

    assert_partial_match(&rule, "This is my test.");
    assert_no_match(&rule, "This is no test.");
}

#[test]
fn optional_middle_element() {
    let rule = rule(vec![
        P::literal("a"),
        P::literal("b").with_min(0),
        P::literal("c"),
    ]);

    assert_no_match(&rule, "b a");
    assert_no_match(&rule, "c a b");
    assert_partial_match(&rule, "b a c");
    assert_partial_match(&rule, "a c b");
    assert_no_match(&rule, "a b b c");
    assert_complete_match(&rule, "a c");
    assert_complete_match(&rule, "a b c");
    assert_no_match(&rule, "a X c");

    assert_eq!(
        spans(&rule, "a b c FOO a b c FOO a c a b c"),
        vec![(0, 5), (10, 15), (20, 23), (24, 29)]
    );
}

#[test]
fn optional_before_longer_tail() {
    let rule = rule(vec![
        P::literal("a"),
        P::literal("b").with_min(0),
        P::literal("c"),
        P::literal("d"),
        P::literal("e"),
    ]);

    assert_complete_match(&rule, "a b c d e");
    assert_complete_match(&rule, "a c d e");
    assert_no_match(&rule, "a d");
    assert_no_match(&rule, "a c b d");
    assert_no_match(&rule, "a c b d e");
}

#[test]
fn optional_head_and_middle() {
    let rule = rule(vec![
        P::literal("a").with_min(0),
        P::literal("b"),
        P::any().with_min(0),
        P::literal("d"),
        P::literal("e"),
    ]);

    assert_eq!(spans(&rule, "a b c d e"), vec![(0, 9)]);
}

#[test]
fn optional_any_token() {
    let rule = rule(vec![P::literal("a"), P::any().with_min(0), P::literal("c")]);

    assert_no_match(&rule, "b a");
    assert_partial_match(&rule, "a c b");
    assert_no_match(&rule, "a b b c");
    assert_complete_match(&rule, "a c");
    assert_complete_match(&rule, "a X c");
    assert_eq!(spans(&rule, "a b c FOO a X c"), vec![(0, 5), (10, 15)]);
}

#[test]
fn bounded_repetition_of_any_token() {
    let two = rule(vec![P::literal("a"), P::any().with_max(2), P::literal("c")]);
    assert_complete_match(&two, "a b c");
    assert_complete_match(&two, "a b b c");
    assert_no_match(&two, "a b b b c");

    let three = rule(vec![P::literal("a"), P::any().with_max(3), P::literal("c")]);
    assert_complete_match(&three, "a b b b c");
    assert_no_match(&three, "a b b b b c");

    let optional = rule(vec![
        P::literal("a"),
        P::any().with_min(0).with_max(2),
        P::literal("c"),
    ]);
    assert_no_match(&optional, "a b");
    assert_no_match(&optional, "c");
    assert_complete_match(&optional, "a c");
    assert_complete_match(&optional, "a x x c");
    assert_no_match(&optional, "a x x x c");
}

#[test]
fn repetition_is_greedy() {
    let rule = rule(vec![P::literal("a"), P::literal("b").with_max(2)]);

    assert_no_match(&rule, "a a");
    assert_complete_match(&rule, "a b b");
    assert_partial_match(&rule, "x a b b");
    assert_eq!(spans(&rule, "a b b b"), vec![(0, 5)]);
    assert_eq!(spans(&rule, "a b b b foo a b b"), vec![(0, 5), (12, 17)]);
}

#[test]
fn unbounded_repetition() {
    let rule = rule(vec![
        P::literal("a"),
        P::literal("b").with_max(-1),
        P::literal("c"),
    ]);

    assert_no_match(&rule, "a c");
    assert_no_match(&rule, "a b");
    assert_no_match(&rule, "b c");
    assert_complete_match(&rule, "a b c");
    assert_complete_match(&rule, "a b b b b b c");
    let long = format!("a {}c", "b ".repeat(25));
    assert_complete_match(&rule, &long);
}

#[test]
fn unbounded_single_element() {
    let rule = rule(vec![P::literal("b").with_max(-1)]);

    assert_eq!(spans(&rule, "b b b x b"), vec![(0, 5), (8, 9)]);
}

#[test]
fn repetition_stops_at_immunized_token() {
    let rule = rule(vec![P::literal("b").with_max(-1)]);

    let mut sentence = TOKENIZER.tokenize("b b b");
    sentence.tokens_mut()[2].immunize();
    let spans = sentence_spans(&rule, &sentence);

    assert_eq!(spans, vec![(0, 1), (4, 5)]);
}

#[test]
fn optional_tail_may_be_absent() {
    let rule = rule(vec![P::literal("a"), P::literal("b").with_min(0)]);

    assert_eq!(spans(&rule, "a b"), vec![(0, 3)]);
    assert_eq!(spans(&rule, "a c"), vec![(0, 1)]);
    assert_eq!(spans(&rule, "a"), vec![(0, 1)]);
    assert_no_match(&rule, "b c");

    let rule = self::rule(vec![
        P::literal("a"),
        P::literal("b").with_min(0),
        P::literal("c").with_min(0),
    ]);
    assert_eq!(spans(&rule, "a c x"), vec![(0, 3)]);
    assert_eq!(spans(&rule, "x a"), vec![(2, 3)]);
}

#[test]
fn longest_of_nested_repetitions() {
    let rule = rule(vec![P::literal("a").with_max(2), P::literal("b").with_max(3)]);

    assert_complete_match(&rule, "a b b b");
    assert_no_match(&rule, "a a");
    assert_no_match(&rule, "a x b b b");
    assert_eq!(spans(&rule, "a a b"), vec![(0, 5)]);
    assert_eq!(spans(&rule, "a a b b"), vec![(0, 7)]);
    assert_eq!(spans(&rule, "a a b b b"), vec![(0, 9)]);
}

#[test]
fn unbounded_skip() {
    let rule = rule(vec![P::literal("a").with_skip(-1), P::literal("b")]);

    assert_complete_match(&rule, "a b");
    assert_complete_match(&rule, "a x b");
    assert_complete_match(&rule, "a x x x b");
}

#[test]
fn skip_with_back_reference() {
    let rule = rule(vec![
        P::regex("a|b").with_skip(-1),
        P::reference(0, Some(Match::surface().in_message_only())),
    ]);

    assert_complete_match(&rule, "a a");
    assert_complete_match(&rule, "b x b");
    assert_complete_match(&rule, "a x x a");
    assert_no_match(&rule, "a b");
    assert_no_match(&rule, "b x a");
    assert_no_match(&rule, "a x x b");

    assert_eq!(spans(&rule, "a foo a and b foo b"), vec![(0, 7), (12, 19)]);
    assert_eq!(spans(&rule, "xx a b x x x b a"), vec![(3, 16)]);
}

#[test]
fn marker_narrows_the_span() {
    let rule = rule(vec![
        P::literal("the"),
        P::any().with_min(0),
        P::literal("bike").with_marker(false),
    ]);

    assert_eq!(spans(&rule, "the nice bike ZZZ"), vec![(0, 8)]);
    assert_eq!(spans(&rule, "the bike ZZZ"), vec![(0, 3)]);

    let rule = self::rule(vec![
        P::literal("a"),
        P::literal("b").with_min(0),
        P::literal("c").with_marker(false),
    ]);
    assert_eq!(spans(&rule, "A B C ZZZ"), vec![(0, 3)]);
    assert_eq!(spans(&rule, "A C ZZZ"), vec![(0, 1)]);
}

#[test]
fn chunk_predicates() {
    init();
    let token = |text: &str, start: usize, chunk: &str| {
        Token::new(text, (start, start + text.len()), Vec::new())
            .with_chunks(vec![chunk.to_string()])
    };
    let sentence = Sentence::new(
        "the red bike is red",
        vec![
            Token::sent_start(),
            token("the", 0, "B-NP"),
            token("red", 4, "I-NP"),
            token("bike", 8, "E-NP"),
            token("is", 13, "B-VP"),
            token("red", 16, "B-ADJP"),
        ],
    );
    let chunk = |chunk: &str, negate: bool| ChunkSpec {
        chunk: chunk.to_string(),
        regex: false,
        negate,
    };

    let inside = rule(vec![P::literal("red").with_chunk(chunk("I-NP", false))]);
    let spans = sentence_spans(&inside, &sentence);
    assert_eq!(spans, vec![(4, 7)]);

    let outside = rule(vec![P::literal("red").with_chunk(chunk("I-NP", true))]);
    let spans = sentence_spans(&outside, &sentence);
    assert_eq!(spans, vec![(16, 19)]);

    let phrase = rule(vec![
        P::any().with_chunk(ChunkSpec {
            chunk: "[BI]-NP".to_string(),
            regex: true,
            negate: false,
        }),
        P::literal("bike"),
    ]);
    let spans = sentence_spans(&phrase, &sentence);
    assert_eq!(spans, vec![(4, 12)]);
}

#[test]
fn corrections_narrow_the_span() {
    let tokens = vec![P::literal("a"), P::literal("b"), P::literal("c")];
    let rule = PatternRuleSpec::new("TEST_RULE", tokens)
        .with_corrections(1, -1)
        .compile(LANGUAGE.clone())
        .unwrap();

    assert_eq!(spans(&rule, "x a b c"), vec![(4, 5)]);
}

#[test]
fn suggestion_collapses_absent_element() {
    init();
    let tokens = vec![
        P::literal("a"),
        P::literal("b").with_min(0),
        P::literal("c"),
    ];
    let message = "Did you mean <suggestion>\\1 \\2 \\3</suggestion>?";
    let rule = PatternRuleSpec::new("TEST_RULE", tokens)
        .with_message(message, Vec::new())
        .compile(LANGUAGE.clone())
        .unwrap();

    let matches = rule.apply(&TOKENIZER.tokenize("a b c")).unwrap();
    assert_eq!(matches[0].suggestions(), &["a b c"]);
    assert_eq!(matches[0].message(), "Did you mean a b c?");

    let matches = rule.apply(&TOKENIZER.tokenize("a c")).unwrap();
    assert_eq!(matches[0].suggestions(), &["a c"]);
}

#[test]
fn sentence_start_rule_only_matches_at_start() {
    let anchored = PatternRuleSpec::new(
        "TEST_RULE",
        vec![P::pos("SENT_START").with_marker(false), P::literal("b")],
    )
    .at_sentence_start()
    .compile(LANGUAGE.clone())
    .unwrap();

    assert_eq!(spans(&anchored, "b a b"), vec![(0, 1)]);
    assert_no_match(&anchored, "a b");

    let unanchored = PatternRuleSpec::new("TEST_RULE", vec![P::literal("b")])
        .at_sentence_start()
        .compile(LANGUAGE.clone())
        .unwrap();
    assert_no_match(&unanchored, "b a b");
}

#[test]
fn immunized_tokens_are_skipped() {
    let rule = rule(vec![P::literal("the"), P::literal("the")]);

    let mut sentence = TOKENIZER.tokenize("the the the");
    let spans = sentence_spans(&rule, &sentence);
    assert_eq!(spans, vec![(0, 7), (4, 11)]);

    sentence.tokens_mut()[1].immunize();
    let spans = sentence_spans(&rule, &sentence);
    assert_eq!(spans, vec![(4, 11)]);

    for token in sentence.tokens_mut() {
        token.immunize();
    }
    assert!(rule.apply(&sentence).unwrap().is_empty());
}

#[test]
fn degenerate_sentences() {
    let rule = rule(vec![P::literal("a").with_min(0), P::any()]);

    assert_no_match(&rule, "");
    let empty = Sentence::new("", Vec::new());
    assert!(rule.apply(&empty).unwrap().is_empty());
}

#[test]
fn exceptions() {
    let bike = ExceptionSpec::new(PredicateSpec::literal("bike"), ExceptionScope::Current);
    let current = rule(vec![P::literal("the"), P::any().with_exception(bike)]);
    assert_eq!(spans(&current, "the bike the car"), vec![(9, 16)]);

    let stop = ExceptionSpec::new(PredicateSpec::literal("stop"), ExceptionScope::Next);
    let next = rule(vec![
        P::literal("a").with_skip(-1).with_exception(stop),
        P::literal("b"),
    ]);
    assert_complete_match(&next, "a x b");
    assert_no_match(&next, "a stop b");

    let the = ExceptionSpec::new(PredicateSpec::literal("the"), ExceptionScope::Previous);
    let previous = rule(vec![P::literal("bike").with_exception(the)]);
    assert_eq!(spans(&previous, "the bike a bike"), vec![(11, 15)]);
}

#[test]
fn negated_unification_finds_disagreement() {
    let number = Unification::new(vec!["number"]);
    let disagreeing = number.clone().negated();
    let tokens = vec![
        P::pos_regex("DT.*").with_unification(disagreeing),
        P::pos_regex("NN.*").with_unification(number),
    ];
    let rule = PatternRuleSpec::new("AGREEMENT", tokens)
        .compile(TAGGED_LANGUAGE.clone())
        .unwrap();

    let spans = |text: &str| sentence_spans(&rule, &TAGGED_TOKENIZER.tokenize(text));

    assert_eq!(spans("I like these bike."), vec![(7, 17)]);
    assert!(spans("I like these bikes.").is_empty());
    assert!(spans("I like this bike.").is_empty());
}

#[test]
fn synthesized_suggestion() {
    init();
    let rule = PatternRuleSpec::new("HE_VB", vec![P::literal("he"), P::pos("VB")])
        .with_message(
            "Did you mean <suggestion>\\1 \\2</suggestion>?",
            vec![Match::surface(), Match::synthesize(None, "VBZ").unwrap()],
        )
        .compile(TAGGED_LANGUAGE.clone())
        .unwrap();

    let matches = rule.apply(&TAGGED_TOKENIZER.tokenize("he walk home")).unwrap();
    assert_eq!(matches[0].span(), (0, 7));
    assert_eq!(matches[0].suggestions(), &["he walks"]);
    assert_eq!(matches[0].message(), "Did you mean he walks?");

    let matches = rule.apply(&TAGGED_TOKENIZER.tokenize("He walk home")).unwrap();
    assert_eq!(matches[0].suggestions(), &["He walks"]);
}

struct FailingSynthesizer;

impl Synthesizer for FailingSynthesizer {
    fn synthesize(&self, _lemma: &str, _pos_pattern: &str) -> io::Result<Vec<String>> {
        Err(io::Error::new(io::ErrorKind::Other, "dictionary unavailable"))
    }
}

#[test]
fn synthesizer_failure_is_propagated() {
    let language = Arc::new(Language::new("en").with_synthesizer(Arc::new(FailingSynthesizer)));
    let rule = PatternRuleSpec::new("TEST_RULE", vec![P::literal("walk")])
        .with_message(
            "<suggestion>\\1</suggestion>",
            vec![Match::synthesize(None, "VBZ").unwrap()],
        )
        .compile(language)
        .unwrap();

    assert!(matches!(
        rule.apply(&TAGGED_TOKENIZER.tokenize("walk")),
        Err(Error::Synthesis { .. })
    ));
    let run = TAGGED_TOKENIZER.tokenize("run");
    assert!(rule.apply(&run).unwrap().is_empty());
}

#[test]
fn builtin_filter() {
    let filter = FilterCall::new("RegexFilter")
        .with_arg("no", "2")
        .with_arg("regexp", "b.*");
    let rule = PatternRuleSpec::new("TEST_RULE", vec![P::literal("the"), P::any()])
        .with_filter(filter)
        .compile(LANGUAGE.clone())
        .unwrap();

    assert_eq!(spans(&rule, "the bike and the car"), vec![(0, 8)]);
}

struct Annotate;

impl RuleFilter for Annotate {
    fn accept(
        &self,
        args: &IndexMap<String, String>,
        rule_match: RuleMatch,
        tokens: &[Token],
        positions: &[usize],
    ) -> Option<RuleMatch> {
        let suffix = args.get("suffix")?;
        if positions.len() != 2 {
            return None;
        }

        let message = format!("{}{}", tokens[0].text(), suffix);
        Some(rule_match.with_message(message))
    }
}

#[test]
fn custom_filter_rewrites_match() {
    let language = Arc::new(Language::new("en").with_filter("Annotate", Arc::new(Annotate)));
    let rule = PatternRuleSpec::new("TEST_RULE", vec![P::literal("the"), P::any()])
        .with_filter(FilterCall::new("Annotate").with_arg("suffix", "!"))
        .compile(language.clone())
        .unwrap();

    let matches = rule.apply(&TOKENIZER.tokenize("so the bike")).unwrap();
    assert_eq!(matches[0].message(), "the!");

    let vetoing = PatternRuleSpec::new("TEST_RULE", vec![P::literal("the"), P::any()])
        .with_filter(FilterCall::new("Annotate"))
        .compile(language)
        .unwrap();
    assert!(spans(&vetoing, "so the bike").is_empty());
}

fn rule_set() -> Rules {
    let double = PatternRuleSpec::new("DOUBLE_THE", vec![P::literal("the"), P::literal("the")])
        .with_category("typos")
        .with_message("Remove one: <suggestion>\\1</suggestion>", Vec::new())
        .compile(LANGUAGE.clone())
        .unwrap();
    let the = PatternRuleSpec::new("THE_A", vec![P::literal("the")])
        .with_category("style")
        .with_message("Consider <suggestion>a</suggestion>.", Vec::new())
        .compile(LANGUAGE.clone())
        .unwrap();
    let bike = PatternRuleSpec::new("BIKE", vec![P::literal("bike")])
        .with_category("style")
        .with_message("Consider <suggestion>bicycle</suggestion>.", Vec::new())
        .disabled()
        .compile(LANGUAGE.clone())
        .unwrap();

    Rules::new(vec![double, the, bike])
}

#[test]
fn earlier_rules_win_on_overlap() {
    init();
    let rules = rule_set();
    let matches = rules.apply(&TOKENIZER.tokenize("Take the the bike, the end.")).unwrap();

    let found: Vec<_> = matches.iter().map(|x| (x.rule_id(), x.span())).collect();
    assert_eq!(found, vec![("DOUBLE_THE", (5, 12)), ("THE_A", (19, 22))]);
}

#[test]
fn rules_correct_text() {
    let rules = rule_set();

    assert_eq!(
        rules.correct(&TOKENIZER.tokenize("Take the the bike.")).unwrap(),
        "Take the bike."
    );
}

#[test]
fn rules_can_be_disabled_enabled() {
    let mut rules = rule_set();
    let sentence = TOKENIZER.tokenize("the the bike");

    rules
        .select_mut(&"typos/double_the".try_into().unwrap())
        .for_each(|x| x.set_enabled(false));
    let ids: Vec<_> = rules
        .apply(&sentence)
        .unwrap()
        .iter()
        .map(|x| x.rule_id().to_string())
        .collect();
    assert_eq!(ids, vec!["THE_A", "THE_A"]);

    rules
        .select_mut(&"style/BIKE".try_into().unwrap())
        .for_each(|x| x.set_enabled(true));
    assert_eq!(rules.apply(&sentence).unwrap().len(), 3);

    assert_eq!(rules.select(&"STYLE".try_into().unwrap()).count(), 2);
}

#[test]
fn rules_options_select_rules() {
    let options: RulesOptions = serde_json::from_str(
        r#"{"ids": ["style"], "ignore_ids": ["style/THE_A"]}"#,
    )
    .unwrap();
    let rules = rule_set().with_options(options);

    let ids: Vec<_> = rules
        .apply(&TOKENIZER.tokenize("the the bike"))
        .unwrap()
        .iter()
        .map(|x| x.rule_id().to_string())
        .collect();
    assert_eq!(ids, vec!["BIKE"]);
}

#[test]
fn rule_spec_from_json() {
    let spec: PatternRuleSpec = serde_json::from_str(
        r#"{
            "id": "A_B_C",
            "category": "typos",
            "tokens": [
                {"text": "a", "skip": -1},
                {"text": "b", "min": 0},
                {"text": "c", "marker": false}
            ],
            "message": "Use <suggestion>\\1</suggestion>."
        }"#,
    )
    .unwrap();
    let rule = spec.compile(LANGUAGE.clone()).unwrap();

    assert!(rule.is_enabled());
    assert_eq!(rule.end_position_correction(), -1);
    assert_eq!(rule.min_occurrence_correction(), 1);

    let matches = rule.apply(&TOKENIZER.tokenize("a x c")).unwrap();
    assert_eq!(matches[0].span(), (0, 1));
    assert_eq!(matches[0].suggestions(), &["a"]);
}

#[test]
fn invalid_specs_are_rejected() {
    let invalid = vec![
        vec![P::literal("a").with_min(2)],
        vec![P::literal("a").with_skip(-2)],
        vec![P::reference(0, None)],
        vec![P::regex("(a")],
    ];

    for tokens in invalid {
        let spec = PatternRuleSpec::new("TEST_RULE", tokens);
        assert!(spec.compile(LANGUAGE.clone()).is_err());
    }
}

lazy_static! {
    static ref OPTIONAL_RULE: PatternRule = rule(vec![
        P::literal("a"),
        P::literal("b").with_min(0),
        P::literal("c"),
    ]);
    static ref LITERAL_RULE: PatternRule = rule(vec![P::literal("a"), P::literal("b")]);
    static ref LOOSE_RULE: PatternRule = rule(vec![
        P::any().with_min(0),
        P::literal("a").with_skip(-1),
        P::any().with_max(-1),
    ]);
}

fn words(seed: &[u8]) -> Vec<&'static str> {
    seed.iter()
        .map(|x| ["a", "b", "c", "x"][(*x % 4) as usize])
        .collect()
}

#[quickcheck]
fn matches_are_in_bounds_and_ordered(seed: Vec<u8>) -> bool {
    let text = words(&seed).join(" ");
    let spans = spans(&OPTIONAL_RULE, &text);
    let len = text.chars().count();

    spans.iter().all(|(start, end)| start < end && *end <= len)
        && spans.windows(2).all(|pair| pair[0].0 < pair[1].0)
}

#[quickcheck]
fn matching_is_deterministic(seed: Vec<u8>) -> bool {
    let sentence = TOKENIZER.tokenize(&words(&seed).join(" "));

    OPTIONAL_RULE.apply(&sentence).unwrap() == OPTIONAL_RULE.apply(&sentence).unwrap()
}

#[quickcheck]
fn literal_pattern_agrees_with_search(seed: Vec<u8>) -> bool {
    let words = words(&seed);
    let expected: Vec<_> = words
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] == "a" && pair[1] == "b")
        .map(|(i, _)| (2 * i, 2 * i + 3))
        .collect();

    spans(&LITERAL_RULE, &words.join(" ")) == expected
}

#[quickcheck]
fn can_match_anything(text: String) -> bool {
    LOOSE_RULE.apply(&TOKENIZER.tokenize(&text)).is_ok()
}
