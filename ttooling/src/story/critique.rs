use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::StoryToolSpec;
use crate::ToolKind;

pub const DEFAULT_FOCUS_AREA: &str = "tổng thể";
pub const MIN_RATING: f32 = 1.0;
pub const MAX_RATING: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryCritiqueRequest {
    pub story: String,
    #[serde(default)]
    pub focus_area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryCritique {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
    pub rating: f32,
}

pub struct AnalyzeStory;

impl StoryToolSpec for AnalyzeStory {
    type Input = StoryCritiqueRequest;
    type Output = StoryCritique;

    const KIND: ToolKind = ToolKind::AnalyzeStory;
    const DESCRIPTION: &'static str = "Phân tích câu chuyện và đưa ra gợi ý cải thiện";
    const FAILURE_MESSAGE: &'static str = "Không thể phân tích câu chuyện";

    fn input_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "story": {"type": "string", "description": "Nội dung câu chuyện"},
                "focusArea": {"type": "string", "description": "Khía cạnh cần tập trung (plot, character, dialogue, etc.)"}
            },
            "required": ["story"]
        })
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "strengths": {"type": "array", "items": {"type": "string"}},
                "weaknesses": {"type": "array", "items": {"type": "string"}},
                "suggestions": {"type": "array", "items": {"type": "string"}},
                "rating": {"type": "number", "minimum": MIN_RATING, "maximum": MAX_RATING}
            },
            "required": ["strengths", "weaknesses", "suggestions", "rating"]
        })
    }

    fn prompt(input: &StoryCritiqueRequest) -> String {
        let focus = input
            .focus_area
            .as_deref()
            .map(str::trim)
            .filter(|focus| !focus.is_empty())
            .unwrap_or(DEFAULT_FOCUS_AREA);

        format!(
            "Phân tích câu chuyện sau và đưa ra đánh giá về {focus}:\n\
             \n\
             {story}\n\
             \n\
             Hãy đánh giá:\n\
             - Điểm mạnh của câu chuyện\n\
             - Điểm yếu cần cải thiện\n\
             - Gợi ý cụ thể để làm hay hơn\n\
             - Điểm số từ 1-10\n\
             \n\
             Trả về JSON với các trường: strengths, weaknesses, suggestions, rating",
            story = input.story,
        )
    }

    fn fallback(_input: &StoryCritiqueRequest) -> StoryCritique {
        StoryCritique {
            strengths: vec!["Có ý tưởng hay".to_string()],
            weaknesses: vec!["Cần phát triển thêm".to_string()],
            suggestions: vec!["Thêm chi tiết".to_string(), "Phát triển nhân vật".to_string()],
            rating: 7.0,
        }
    }

    fn normalize(mut output: StoryCritique) -> StoryCritique {
        output.rating = if output.rating.is_finite() {
            output.rating.clamp(MIN_RATING, MAX_RATING)
        } else {
            MIN_RATING
        };
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::StoryTool;
    use crate::story::testing::{ScriptedProvider, client};

    fn request(focus_area: Option<&str>) -> StoryCritiqueRequest {
        StoryCritiqueRequest {
            story: "Ngày xưa có một chú mèo.".to_string(),
            focus_area: focus_area.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn rating_is_clamped_into_range() {
        let provider = ScriptedProvider::replying(
            r#"{"strengths":["Ngắn gọn"],"weaknesses":[],"suggestions":[],"rating":14}"#,
        );
        let tool = StoryTool::<AnalyzeStory>::new(client(provider));

        let critique = tool.run(request(None)).await.expect("run should succeed");
        assert_eq!(critique.rating, 10.0);
    }

    #[tokio::test]
    async fn focus_area_defaults_to_overall() {
        let provider = ScriptedProvider::replying("oops");
        let tool = StoryTool::<AnalyzeStory>::new(client(provider.clone()));

        let critique = tool.run(request(Some("  "))).await.expect("fallback is not an error");

        assert_eq!(critique.rating, 7.0);
        assert_eq!(critique.suggestions, vec!["Thêm chi tiết", "Phát triển nhân vật"]);
        assert!(
            provider
                .last_prompt()
                .starts_with("Phân tích câu chuyện sau và đưa ra đánh giá về tổng thể:")
        );
    }
}
