//! Given step definitions
//!
//! Steps that set up the corpus for a scenario.

use cucumber::{gherkin::Step, given};

use crate::world::{CorpusWorld, WordRow};

// =============================================================================
// Corpus construction
// =============================================================================

#[given(expr = "a corpus {string} with the following words:")]
fn corpus_with_words(world: &mut CorpusWorld, identificator: String, step: &Step) {
    let table = step.table.as_ref().expect("step needs a table");
    let mut rows = table.rows.iter();
    let header = rows.next().expect("table needs a header row");
    let column = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .unwrap_or_else(|| panic!("missing column '{}'", name))
    };
    let (verse, text, lemma) = (column("verse"), column("text"), column("lemma"));

    world.rows = rows
        .map(|row| WordRow {
            verse: row[verse].clone(),
            text: row[text].clone(),
            lemma: row[lemma].clone(),
        })
        .collect();
    world.build(&identificator);
}
