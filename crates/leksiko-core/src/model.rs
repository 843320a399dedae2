//! Records of one dictionary snapshot, as they appear on the wire.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    Adj,
    /// Preposition
    Adp,
    Adv,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    /// Proper noun
    Propn,
    Verb,
}

impl PartOfSpeech {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfSpeech::Adj => "ADJ",
            PartOfSpeech::Adp => "ADP",
            PartOfSpeech::Adv => "ADV",
            PartOfSpeech::Intj => "INTJ",
            PartOfSpeech::Noun => "NOUN",
            PartOfSpeech::Num => "NUM",
            PartOfSpeech::Part => "PART",
            PartOfSpeech::Pron => "PRON",
            PartOfSpeech::Propn => "PROPN",
            PartOfSpeech::Verb => "VERB",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Masc,
    Fem,
    Neut,
}

/// Grammatical case (`ptosi`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Case {
    Nom,
    Gen,
    Acc,
    Voc,
    #[serde(rename = "ERROR")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrammaticalNumber {
    Sing,
    Plur,
    #[serde(rename = "ERROR")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Person {
    #[serde(rename = "1")]
    First,
    #[serde(rename = "2")]
    Second,
    #[serde(rename = "3")]
    Third,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tense {
    Past,
    Pres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aspect {
    Imp,
    Ind,
    Perf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Imp,
    Ind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerbForm {
    Conv,
    Fin,
    Inf,
    Part,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Voice {
    Act,
    Pass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degree {
    Cmp,
    Sup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    pub greek: String,
    pub english: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub en: Vec<String>,
    #[serde(default)]
    pub ru: Vec<String>,
}

/// One inflected form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub form: String,
    pub lemma: String,
    /// `None` for forms whose lemma has no entry; `-1` on the wire
    #[serde(default, with = "lemma_link")]
    pub lemma_index: Option<usize>,
    #[serde(default)]
    pub frequency_rank: Option<u32>,
    pub pos_en: PartOfSpeech,
    /// Greek morphological tag, e.g. `AOR_A_ENIKO`
    #[serde(default)]
    pub pos_el: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub ptosi: Option<Case>,
    #[serde(default)]
    pub number: Option<GrammaticalNumber>,
    #[serde(default)]
    pub degree: Option<Degree>,
    #[serde(default)]
    pub person: Option<Person>,
    #[serde(default)]
    pub tense: Option<Tense>,
    #[serde(default)]
    pub aspect: Option<Aspect>,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub verbform: Option<VerbForm>,
    #[serde(default)]
    pub voice: Option<Voice>,
    #[serde(default)]
    pub tags: Option<String>,
}

mod lemma_link {
    use super::*;

    const UNLINKED: i64 = -1;

    pub fn serialize<S: Serializer>(
        index: &Option<usize>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match index {
            Some(index) => serializer.serialize_u64(*index as u64),
            None => serializer.serialize_i64(UNLINKED),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<usize>, D::Error> {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw.and_then(|i| usize::try_from(i).ok()))
    }
}

/// A headword and the forms realizing it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lemma {
    pub lemma: String,
    pub pos_en: PartOfSpeech,
    #[serde(default)]
    pub frequency_rank: Option<u32>,
    #[serde(default)]
    pub translation: Option<Translation>,
    #[serde(default)]
    pub word_indices: Vec<usize>,
}

/// Everything sharing one surface form; a form can be ambiguous across
/// parts of speech, hence several words and lemmas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCard {
    pub form: String,
    #[serde(default)]
    pub phrases: Vec<Phrase>,
    #[serde(default)]
    pub word_indices: Vec<usize>,
    #[serde(default)]
    pub lemma_indices: Vec<usize>,
}

/// One fully loaded dictionary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub lemmas: Vec<Lemma>,
    pub words: Vec<Word>,
    /// Lemma indices per part-of-speech tag, keyed by the tag's wire name
    pub pos_lemma_index: BTreeMap<String, Vec<usize>>,
    /// Absent in snapshots produced before word cards existed
    #[serde(default)]
    pub word_cards: Vec<WordCard>,
}

/// A lemma/word link that does not point back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DanglingLink {
    /// The lemma lists a word index past the end of `words`
    MissingWord { lemma: usize, word: usize },
    /// The lemma lists a word whose `lemma_index` points elsewhere
    ForeignWord { lemma: usize, word: usize, owner: usize },
    /// The lemma lists a word that is not linked to any lemma
    UnlinkedWord { lemma: usize, word: usize },
}

impl Snapshot {
    /// Lemma indices tagged `pos`, empty when the tag has no members
    pub fn lemmas_tagged(&self, pos: PartOfSpeech) -> &[usize] {
        self.pos_lemma_index
            .get(pos.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every lemma whose word list is not symmetric with the words' own
    /// `lemma_index`
    pub fn dangling_links(&self) -> Vec<DanglingLink> {
        let mut dangling = Vec::new();
        for (lemma, entry) in self.lemmas.iter().enumerate() {
            for &word in &entry.word_indices {
                match self.words.get(word) {
                    None => dangling.push(DanglingLink::MissingWord { lemma, word }),
                    Some(w) => match w.lemma_index {
                        None => dangling.push(DanglingLink::UnlinkedWord { lemma, word }),
                        Some(owner) if owner != lemma => {
                            dangling.push(DanglingLink::ForeignWord { lemma, word, owner })
                        }
                        Some(_) => {}
                    },
                }
            }
        }
        dangling
    }
}
