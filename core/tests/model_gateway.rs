//! End-to-end checks of the model gateway over on-disk artifacts.

use libbopomofo_core::{
    BopomofoModel, Config, GridOptions, LanguageModel, Lexicon, PhraseGrid, UserPhrases,
};

const TABLE: &str = "\
ㄋㄧˇ 你 -3.21
ㄋㄧˇ 妳 -4.47
ㄏㄠˇ 好 -2.93
ㄇㄣ˙ 們 -3.05
ㄋㄧˇ-ㄏㄠˇ 你好 -4.05
";

fn artifacts(dir: &std::path::Path) -> Lexicon {
    let fst_path = dir.join("lexicon.fst");
    let bin_path = dir.join("lexicon.bincode");
    Lexicon::from_text(TABLE)
        .unwrap()
        .save_fst_bincode(&fst_path, &bin_path)
        .unwrap();
    Lexicon::load_from_fst_bincode(&fst_path, &bin_path).unwrap()
}

#[test]
fn grid_walks_over_fst_lexicon() {
    let dir = tempfile::tempdir().unwrap();
    let model = BopomofoModel::new(artifacts(dir.path()), Config::default());

    let grid = PhraseGrid::build(&["ㄋㄧˇ", "ㄏㄠˇ"], &model, GridOptions::default());
    let walk = grid.walk(&[]);
    assert_eq!(walk.text(), "你好");
    assert_eq!(walk.steps().len(), 1);

    let texts: Vec<_> = model
        .candidates(&["ㄋㄧˇ"])
        .into_iter()
        .map(|c| c.text)
        .collect();
    assert_eq!(texts, vec!["你", "妳"]);
}

#[test]
fn learned_phrase_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("user.redb");
    let readings = ["ㄏㄠˇ", "ㄇㄣ˙"];

    {
        let (user, excluded) = UserPhrases::open_redb(&db).unwrap();
        let model = BopomofoModel::new(artifacts(dir.path()), Config::default())
            .with_user_phrases(user, excluded);
        let before = PhraseGrid::build(&readings, &model, GridOptions::default()).walk(&[]);
        assert_eq!(before.steps().len(), 2);

        model.add_user_phrase("ㄏㄠˇ-ㄇㄣ˙", "好們").unwrap();
        assert!(model.has_user_phrase("ㄏㄠˇ-ㄇㄣ˙", "好們"));
    }

    let (user, excluded) = UserPhrases::open_redb(&db).unwrap();
    let model = BopomofoModel::new(artifacts(dir.path()), Config::default())
        .with_user_phrases(user, excluded);
    let after = PhraseGrid::build(&readings, &model, GridOptions::default()).walk(&[]);
    assert_eq!(after.text(), "好們");
    assert_eq!(after.steps().len(), 1);
}

#[test]
fn excluded_phrase_drops_out_of_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let model = BopomofoModel::new(artifacts(dir.path()), Config::default());
    assert!(model.exclude_phrase("ㄋㄧˇ", "妳").unwrap());

    let texts: Vec<_> = model
        .candidates(&["ㄋㄧˇ"])
        .into_iter()
        .map(|c| c.text)
        .collect();
    assert_eq!(texts, vec!["你"]);
}
