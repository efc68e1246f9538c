use topicmap_core::types::{ClusterId, ScoredTerm, TopicKeywords, TopicLabels, NOISE, OUTLIERS_LABEL};

const SINGLE_WORD_TERMS: usize = 3;

/// Human-readable label for one keyword set.
///
/// Two phrases when available, otherwise one phrase plus the best single
/// word, otherwise the three best single words.
pub fn label_for(id: ClusterId, keywords: &[ScoredTerm]) -> String {
    if id == NOISE {
        return OUTLIERS_LABEL.to_string();
    }
    let phrases: Vec<&str> = keywords.iter().filter(|t| t.is_phrase()).map(|t| t.term.as_str()).collect();
    let words: Vec<&str> = keywords.iter().filter(|t| !t.is_phrase()).map(|t| t.term.as_str()).collect();

    let parts: Vec<&str> = match phrases.as_slice() {
        [first, second, ..] => vec![*first, *second],
        [only] => std::iter::once(*only).chain(words.first().copied()).collect(),
        [] => words.into_iter().take(SINGLE_WORD_TERMS).collect(),
    };
    if parts.is_empty() {
        format!("Topic {id}: Empty")
    } else {
        format!("Topic {id}: {}", parts.join(", "))
    }
}

/// Labels for every keyword set plus the fixed outlier label for `-1`.
pub fn label_topics(keywords: &TopicKeywords) -> TopicLabels {
    let mut labels: TopicLabels = keywords
        .iter()
        .filter(|(&id, _)| id != NOISE)
        .map(|(&id, set)| (id, label_for(id, set)))
        .collect();
    labels.insert(NOISE, OUTLIERS_LABEL.to_string());
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(list: &[&str]) -> Vec<ScoredTerm> {
        list.iter()
            .enumerate()
            .map(|(i, t)| ScoredTerm { term: (*t).to_string(), score: 1.0 - i as f32 * 0.1 })
            .collect()
    }

    #[test]
    fn prefers_two_phrases() {
        let set = terms(&["solar", "solar panel", "battery", "panel install", "grid tie"]);
        assert_eq!(label_for(0, &set), "Topic 0: solar panel, panel install");
    }

    #[test]
    fn one_phrase_takes_best_single_word() {
        let set = terms(&["solar panel", "battery", "inverter"]);
        assert_eq!(label_for(3, &set), "Topic 3: solar panel, battery");
        assert_eq!(label_for(3, &terms(&["solar panel"])), "Topic 3: solar panel");
    }

    #[test]
    fn falls_back_to_three_words() {
        let set = terms(&["seed", "soil", "compost", "water"]);
        assert_eq!(label_for(1, &set), "Topic 1: seed, soil, compost");
    }

    #[test]
    fn empty_set_and_noise() {
        assert_eq!(label_for(2, &[]), "Topic 2: Empty");
        assert_eq!(label_for(NOISE, &terms(&["anything"])), OUTLIERS_LABEL);
    }

    #[test]
    fn outliers_label_always_present() {
        let labels = label_topics(&TopicKeywords::new());
        assert_eq!(labels.get(&NOISE).map(String::as_str), Some(OUTLIERS_LABEL));
        assert_eq!(labels.len(), 1);
    }
}
