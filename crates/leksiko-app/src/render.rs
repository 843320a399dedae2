use leksiko_core::dictionary::{LemmaRef, WordCardRef};
use leksiko_core::{Article, QueueType, Session};
use serde_json::json;

pub fn front(session: &Session, category: QueueType, json: bool) -> anyhow::Result<()> {
    match session.front_article(category)? {
        Some(article) => article_out(&article, json),
        None => empty(category),
    }
}

/// Print whatever sits at queue entry `index` of `category`
pub fn index(
    session: &Session,
    category: QueueType,
    index: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let Some(index) = index else {
        return empty(category);
    };

    let dictionary = session.dictionary();
    let article = if category.indexes_word_cards() {
        Article::WordCard(dictionary.get_word_card(index)?)
    } else {
        Article::Lemma(dictionary.get_lemma(index)?)
    };
    article_out(&article, json)
}

pub fn status(session: &Session, json: bool) -> anyhow::Result<()> {
    let queues = session.queues();
    let current = queues.current_category();

    if json {
        let categories: Vec<_> = QueueType::ALL
            .into_iter()
            .map(|c| {
                json!({
                    "category": c,
                    "front": queues.get_front(c),
                    "length": queues.get_length(c),
                })
            })
            .collect();
        let out = json!({ "current": current, "queues": categories });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for category in QueueType::ALL {
        let marker = if current == Some(category) { "*" } else { " " };
        let front = queues
            .get_front(category)
            .map_or("-".to_string(), |i| i.to_string());
        println!(
            "{marker} {:<11} {:>7} entries, front {front}",
            category.as_str(),
            queues.get_length(category)
        );
    }
    Ok(())
}

fn empty(category: QueueType) -> anyhow::Result<()> {
    println!("{category}: queue is empty");
    Ok(())
}

fn article_out(article: &Article<'_>, json: bool) -> anyhow::Result<()> {
    match article {
        Article::Lemma(lemma) if json => {
            println!("{}", serde_json::to_string_pretty(lemma.record())?)
        }
        Article::WordCard(card) if json => {
            println!("{}", serde_json::to_string_pretty(card.record())?)
        }
        Article::Lemma(lemma) => lemma_text(lemma)?,
        Article::WordCard(card) => card_text(card)?,
    }
    Ok(())
}

fn lemma_text(lemma: &LemmaRef<'_>) -> anyhow::Result<()> {
    let record = lemma.record();
    println!("#{} {} [{}]", lemma.index(), record.lemma, record.pos_en);

    if let Some(translation) = &record.translation {
        if !translation.en.is_empty() {
            println!("  en: {}", translation.en.join("; "));
        }
        if !translation.ru.is_empty() {
            println!("  ru: {}", translation.ru.join("; "));
        }
    }

    let forms: Vec<_> = lemma
        .words()?
        .iter()
        .map(|w| w.record().form.as_str())
        .collect();
    if !forms.is_empty() {
        println!("  forms: {}", forms.join(", "));
    }
    Ok(())
}

fn card_text(card: &WordCardRef<'_>) -> anyhow::Result<()> {
    let record = card.record();
    println!("#{} {}", card.index(), record.form);

    for lemma in card.lemmas()? {
        let lemma = lemma.record();
        let gloss = lemma
            .translation
            .as_ref()
            .map(|t| t.en.join("; "))
            .unwrap_or_default();
        println!("  {} [{}] {gloss}", lemma.lemma, lemma.pos_en);
    }

    for phrase in &record.phrases {
        println!("  {} / {}", phrase.greek, phrase.english);
    }
    Ok(())
}
