//! Keyword-driven follow-up suggestions.

pub const MAX_SUGGESTIONS: usize = 3;

const KEYWORD_GROUPS: [(&[&str], [&str; 2]); 3] = [
    (
        &["câu chuyện", "truyện"],
        [
            "Tạo thêm một câu chuyện khác",
            "Phát triển nhân vật trong câu chuyện này",
        ],
    ),
    (
        &["nhân vật"],
        ["Tạo thêm nhân vật phụ", "Mô tả chi tiết về nhân vật này"],
    ),
    (
        &["cốt truyện", "kịch bản"],
        ["Thêm tình tiết bất ngờ", "Tạo kết thúc khác"],
    ),
];

pub const DEFAULT_SUGGESTIONS: [&str; 3] = [
    "Kể cho tôi một ý tưởng câu chuyện mới",
    "Tạo một nhân vật thú vị",
    "Giúp tôi nghĩ ra một cốt truyện",
];

/// Up to three suggestions, in keyword-group order, for the user's message.
pub fn suggestions_for(user_message: &str) -> Vec<String> {
    let lowered = user_message.to_lowercase();

    let matched = KEYWORD_GROUPS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .flat_map(|(_, suggestions)| suggestions.iter())
        .take(MAX_SUGGESTIONS)
        .map(|suggestion| suggestion.to_string())
        .collect::<Vec<_>>();

    if matched.is_empty() {
        return DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect();
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_suggestions_come_before_character_ones() {
        let suggestions = suggestions_for("Hãy kể cho tôi một câu chuyện về nhân vật chính");

        assert_eq!(
            suggestions,
            vec![
                "Tạo thêm một câu chuyện khác",
                "Phát triển nhân vật trong câu chuyện này",
                "Tạo thêm nhân vật phụ",
            ]
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let suggestions = suggestions_for("KỊCH BẢN phim");
        assert_eq!(suggestions, vec!["Thêm tình tiết bất ngờ", "Tạo kết thúc khác"]);
    }

    #[test]
    fn unmatched_message_gets_defaults() {
        assert_eq!(suggestions_for("xin chào"), DEFAULT_SUGGESTIONS);
    }

    #[test]
    fn plot_keyword_also_matches_story_group() {
        // "cốt truyện" contains "truyện".
        let suggestions = suggestions_for("cốt truyện");
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions[0], "Tạo thêm một câu chuyện khác");
        assert_eq!(suggestions[2], "Thêm tình tiết bất ngờ");
    }
}
