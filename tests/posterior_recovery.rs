//! End-to-end checks: noise a corpus with known parameters, then estimate them back.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use lingnoise::phonological::{PhonologicalNoiser, PhonologicalParams};
use lingnoise::vocab::{VocabFilter, Vocabulary};
use lingnoise::wordlist::FunctionalWords;
use lingnoise::{BilingualLexicon, Config, NoiseComposer, Posterior};

/// Consonant-vowel-consonant words: each has exactly one interior context.
fn cvc_words() -> Vec<String> {
    let onsets = "bcdfghjklmnpr".chars();
    let mut words = Vec::new();
    for c1 in onsets {
        for v in "aeiou".chars() {
            for c2 in "bdgklmnprst".chars() {
                words.push([c1, v, c2].iter().collect());
            }
        }
    }
    words
}

/// Everyday multi-syllable vocabulary, where neighbouring contexts overlap.
const NATURAL_WORDS: &str = "\
    about above account across action active actually address advance afternoon \
    against agency agreement already although amount animal another answer anything \
    appear apple approach argument around arrive article artist attention autumn \
    balance basket battle beautiful because become before begin behind believe \
    benefit between bicycle blanket border bottle bottom branch breakfast bridge \
    brother budget building butter button camera campaign candle capital captain \
    careful carpet castle ceiling center century chapter chicken children chocolate \
    circle citizen climate collect college colour comfort common company complete \
    computer concert condition consider contain control corner cotton country courage \
    cousin cover credit culture current curtain customer danger daughter decide \
    defence delicate deliver demand desert design detail develop diamond dinner \
    direction distance doctor dollar double dragon drawer during eager easily \
    economy edition effort eleven empire energy engine enough entrance envelope \
    equal escape evening event exactly example explain family famous farmer \
    father feather festival figure finger finish flower follow forest forget \
    fortune forward freedom friendly further garden gather gentle giant glitter \
    golden government grammar guitar habit hammer happen harbour harvest heavy \
    history holiday honest horizon hospital hundred husband imagine improve include \
    increase island jacket journey jungle kitchen ladder language later leather \
    lemon lesson letter library limit listen little machine magazine manage \
    market master matter meadow measure medicine member memory message method \
    middle minute mirror modern moment monkey morning mother motion mountain \
    museum music narrow nation nature needle neighbour never noble normal \
    notice number object ocean office official orange order organise other \
    outside owner packet paper parent party pattern pencil people pepper \
    perfect period person picture pillow planet plastic pleasure pocket poetry \
    police popular position potato powder present pretty prison problem produce \
    promise proper public purple question rabbit rather reason record region \
    remember report rescue result return river rocket salad sample season \
    second secret section service settle shadow shoulder silver simple sister \
    soldier spirit spring station stomach story strange student sudden summer \
    supper surface system table talent target teacher theatre thunder ticket \
    timber tomato tower travel treasure trouble tunnel turkey uncle under \
    valley village visit volume wagon walnut water weather window winter \
    wisdom wonder yellow yesterday";

/// Noise `words` with `theta_phon` under `seed`, then estimate it back.
fn noised_posterior(words: &[String], theta_phon: f64, seed: u64) -> Posterior {
    let corpus = words.join(" ");
    let vocab = Vocabulary::from_lines([corpus.as_str()], VocabFilter::Alphabetic);

    let params = PhonologicalParams {
        lang: "eng".to_string(),
        text_file: PathBuf::from("unused.txt"),
        theta_phon,
        output_dir: None,
        seed: Some(seed),
        ipa_classes: None,
    };
    let noiser = PhonologicalNoiser::from_vocabulary(&params, &Config::default(), &vocab).unwrap();

    let lexicon =
        BilingualLexicon::from_pairs(words.iter().map(|w| (w.clone(), noiser.apply_noise(w))));
    let source_vocab = Vocabulary::from_lines([corpus.as_str()], VocabFilter::NoDigits);
    Posterior::new(
        "eng",
        &lexicon,
        source_vocab,
        FunctionalWords::default(),
        &Config::default(),
    )
    .unwrap()
}

#[test]
fn phonological_theta_is_recovered() {
    let words = cvc_words();
    assert_eq!(words.len(), 715);
    let posterior = noised_posterior(&words, 0.3, 7);

    let theta_phon = posterior.phonological();
    assert!(
        (theta_phon - 0.3).abs() <= 0.1,
        "estimated theta_phon {theta_phon} too far from 0.3"
    );

    // Every changed pair is a single interior substitution, so nothing is lexical.
    let (_, theta_content) = posterior.lexical();
    assert_eq!(theta_content, 0.0);
}

#[test]
fn phonological_theta_is_recovered_from_natural_words() {
    let words: Vec<String> = NATURAL_WORDS.split_whitespace().map(String::from).collect();
    assert!(words.len() >= 250);

    for seed in 1..=5 {
        let theta_phon = noised_posterior(&words, 0.3, seed).phonological();
        assert!(
            (theta_phon - 0.3).abs() <= 0.1,
            "seed {seed}: estimated theta_phon {theta_phon} too far from 0.3"
        );
    }
}

#[test]
fn posterior_from_files() {
    let dir = tempfile::tempdir().unwrap();

    let lexicon_path = dir.path().join("lexicon.json");
    std::fs::write(
        &lexicon_path,
        r#"{
            "the": {"el": 10, "la": 4},
            "house": "casa",
            "cats": {"cat": 3},
            "running": {"running": 1, "corriendo": 5}
        }"#,
    )
    .unwrap();

    let text_path = dir.path().join("source.txt");
    let mut text = std::fs::File::create(&text_path).unwrap();
    writeln!(text, "The cats were running into the house, 42 times.").unwrap();

    let wordlist_path = dir.path().join("wordlist.json");
    let by_tag: BTreeMap<&str, Vec<&str>> = [("DET", vec!["the"])].into_iter().collect();
    std::fs::write(&wordlist_path, serde_json::to_string(&by_tag).unwrap()).unwrap();

    let posterior = Posterior::from_files(
        "eng",
        &lexicon_path,
        &text_path,
        &wordlist_path,
        &Config::default(),
    )
    .unwrap();
    let estimate = posterior.estimate();

    // the -> el is a new functional word.
    assert_eq!(estimate.theta_func, 1.0);
    // house -> casa is new; cats -> cat and running -> running are not.
    assert!((estimate.theta_content - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn noise_pipeline_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("corpus.txt");
    std::fs::write(
        &corpus_path,
        "the walking man was talking to the singing cat\nrunning and jumping all evening\n",
    )
    .unwrap();
    let out_dir = dir.path().join("artifacts");

    let corpus = corpus_path.display();
    let out = out_dir.display();
    let spec = format!(
        "phonological-lang=eng,theta_phon=0.3,text_file=<{corpus}>,output_dir=<{out}>;\
         lexical-text_file=<{corpus}>,theta_global=0.2,output_dir=<{out}>;\
         morph-text_file=<{corpus}>,theta_morph=0.4,output_dir=<{out}>"
    );

    let composer = NoiseComposer::from_spec(&spec, &Config::default()).unwrap();
    composer.record_artifacts().unwrap();
    for name in [
        "phon_context_map.json",
        "phon_equivalence_targets.json",
        "lexical_vocab_map.json",
        "morph_suffix_map.json",
    ] {
        assert!(out_dir.join(name).exists(), "missing artifact {name}");
    }

    let lines = ["the walking man", "running and jumping all evening"];
    let noised = composer.apply_lines(&lines);
    assert_eq!(noised.len(), 2);
    for (line, out) in lines.iter().zip(&noised) {
        assert_eq!(line.split(' ').count(), out.split(' ').count());
    }
}
