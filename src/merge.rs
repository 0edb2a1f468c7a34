use tracing::debug;

use crate::error::{ExtractError, Result};
use crate::model::{BilingualRecord, CreatureRecord, Language};
use crate::parser::extract::moves::canonical_accuracy;

const CATEGORY_SUFFIX: &str = " Pokémon";

/// Join an English and a German record of the same creature.
///
/// The index number is the join key; names are never compared since they
/// differ by language. Accuracy sentinels are made uniform across both halves
/// and the German category gets the suffix the English one already carries.
pub fn merge(english: CreatureRecord, german: CreatureRecord) -> Result<BilingualRecord> {
    if english.language != Language::English {
        return Err(ExtractError::LanguageMismatch(english.language.as_str()));
    }
    if german.language != Language::German {
        return Err(ExtractError::LanguageMismatch(german.language.as_str()));
    }
    if english.identity.index != german.identity.index {
        return Err(ExtractError::IdentityMismatch {
            english: english.identity.index,
            german: german.identity.index,
        });
    }

    let index = english.identity.index;
    let english = reconcile(english);
    let german = reconcile(german);
    debug!(index, english = %english.identity.name, german = %german.identity.name, "merged");

    Ok(BilingualRecord {
        index,
        english,
        german,
    })
}

fn reconcile(mut record: CreatureRecord) -> CreatureRecord {
    if !record.category.is_empty() && !record.category.ends_with(CATEGORY_SUFFIX.trim_start()) {
        record.category.push_str(CATEGORY_SUFFIX);
    }
    for m in record
        .moves
        .level_up
        .iter_mut()
        .chain(record.moves.technical.iter_mut())
    {
        m.accuracy = canonical_accuracy(m.accuracy);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Identity, Move, Stat};
    use crate::parser::extract::moves::UNRATABLE_ACCURACY;

    fn record(language: Language, name: &str, index: u32, category: &str) -> CreatureRecord {
        CreatureRecord {
            language,
            identity: Identity {
                name: name.into(),
                index,
            },
            category: category.into(),
            types: vec!["Electric".into()],
            introduction: String::new(),
            biology: Vec::new(),
            abilities: Default::default(),
            stats: Stat::ALL.iter().map(|s| (*s, 50)).collect(),
            breeding: Default::default(),
            gender_ratio: None,
            physique: None,
            evolution_chain: vec![name.into()],
            forms: Vec::new(),
            moves: Default::default(),
            appearances: Vec::new(),
            dex_entries: Vec::new(),
            trivia: Vec::new(),
        }
    }

    #[test]
    fn differing_index_is_rejected() {
        let err = merge(
            record(Language::English, "Pikachu", 25, "Mouse Pokémon"),
            record(Language::German, "Raichu", 26, "Maus"),
        )
        .unwrap_err();
        assert_eq!(err, ExtractError::IdentityMismatch { english: 25, german: 26 });
    }

    #[test]
    fn same_language_is_rejected() {
        let err = merge(
            record(Language::English, "Pikachu", 25, "Mouse Pokémon"),
            record(Language::English, "Pikachu", 25, "Mouse Pokémon"),
        )
        .unwrap_err();
        assert_eq!(err, ExtractError::LanguageMismatch("english"));
    }

    #[test]
    fn matching_index_merges() {
        let merged = merge(
            record(Language::English, "Pikachu", 25, "Mouse Pokémon"),
            record(Language::German, "Pikachu", 25, "Maus"),
        )
        .unwrap();
        assert_eq!(merged.index, 25);
        assert_eq!(merged.english.category, "Mouse Pokémon");
        assert_eq!(merged.german.category, "Maus Pokémon");
    }

    #[test]
    fn accuracy_sentinels_are_canonical() {
        let mut german = record(Language::German, "Pikachu", 25, "Maus");
        german.moves.level_up.push(Move {
            learned_at: "5".into(),
            name: "Heuler".into(),
            move_type: "Normal".into(),
            category: "Status".into(),
            power: 0,
            accuracy: 999,
            pp: 40,
        });
        let merged = merge(record(Language::English, "Pikachu", 25, "Mouse Pokémon"), german).unwrap();
        assert_eq!(merged.german.moves.level_up[0].accuracy, UNRATABLE_ACCURACY);
    }
}
