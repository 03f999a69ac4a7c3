use criterion::{black_box, criterion_group, criterion_main, Criterion};
use patternrule::lang::Language;
use patternrule::rule::{grammar::Match, pattern::PatternTokenSpec as P, PatternRuleSpec};
use patternrule::tokenizer::Tokenizer;
use patternrule::Rules;
use std::sync::Arc;
use std::time::Duration;

const TEXT: &str =
    "The the quick brown fox jumps over a lazy dog and then a a cat walks over the the bridge.";

fn rules() -> Rules {
    let language = Arc::new(Language::new("en"));
    let specs = vec![
        PatternRuleSpec::new("DOUBLE_THE", vec![P::literal("the"), P::literal("the")])
            .with_message(
                "Remove one: <suggestion>\\1</suggestion>",
                vec![Match::surface()],
            ),
        PatternRuleSpec::new("DOUBLE_A", vec![P::literal("a"), P::reference(0, None)])
            .with_message("Remove one: <suggestion>\\1</suggestion>", Vec::new()),
        PatternRuleSpec::new(
            "OVER_THE",
            vec![
                P::literal("over").with_skip(-1),
                P::any().with_min(0),
                P::regex("bridge|dog"),
            ],
        ),
    ];

    Rules::new(
        specs
            .into_iter()
            .map(|spec| spec.compile(language.clone()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap(),
    )
}

fn tokenize(c: &mut Criterion) {
    let tokenizer = Tokenizer::default();

    c.bench_function("tokenize", |b| b.iter(|| tokenizer.tokenize(black_box(TEXT))));
}

fn apply_rules(c: &mut Criterion) {
    let rules = rules();
    let sentence = Tokenizer::default().tokenize(TEXT);

    c.bench_function("apply rules", |b| b.iter(|| rules.apply(black_box(&sentence)).unwrap()));
}

fn no_warmup_criterion() -> Criterion {
    Criterion::default()
        .sample_size(20)
        .warm_up_time(Duration::from_nanos(1))
}

criterion_group!(
name = matching;
config = no_warmup_criterion();
targets =
    tokenize,
    apply_rules,
);

criterion_main!(matching);
