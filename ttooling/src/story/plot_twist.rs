use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{StoryToolSpec, genre_or_default};
use crate::ToolKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotTwistRequest {
    pub current_plot: String,
    pub characters: Vec<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotTwist {
    pub twist: String,
    pub explanation: String,
    pub impact: String,
    pub new_direction: String,
}

pub struct CreatePlotTwist;

impl StoryToolSpec for CreatePlotTwist {
    type Input = PlotTwistRequest;
    type Output = PlotTwist;

    const KIND: ToolKind = ToolKind::CreatePlotTwist;
    const DESCRIPTION: &'static str = "Tạo tình tiết bất ngờ thú vị cho câu chuyện";
    const FAILURE_MESSAGE: &'static str = "Không thể tạo tình tiết bất ngờ";

    fn input_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "currentPlot": {"type": "string", "description": "Cốt truyện hiện tại"},
                "characters": {"type": "array", "items": {"type": "string"}, "description": "Danh sách nhân vật"},
                "genre": {"type": "string", "description": "Thể loại câu chuyện"}
            },
            "required": ["currentPlot", "characters"]
        })
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "twist": {"type": "string"},
                "explanation": {"type": "string"},
                "impact": {"type": "string"},
                "newDirection": {"type": "string"}
            },
            "required": ["twist", "explanation", "impact", "newDirection"]
        })
    }

    fn prompt(input: &PlotTwistRequest) -> String {
        format!(
            "Tạo tình tiết bất ngờ cho câu chuyện {genre}:\n\
             Cốt truyện hiện tại: {plot}\n\
             Nhân vật: {characters}\n\
             \n\
             Hãy tạo ra:\n\
             - Tình tiết bất ngờ thú vị\n\
             - Giải thích logic\n\
             - Tác động đến câu chuyện\n\
             - Hướng phát triển mới\n\
             \n\
             Trả về JSON với các trường: twist, explanation, impact, newDirection",
            genre = genre_or_default(&input.genre),
            plot = input.current_plot,
            characters = input.characters.join(", "),
        )
    }

    fn fallback(_input: &PlotTwistRequest) -> PlotTwist {
        PlotTwist {
            twist: "Một bí mật được tiết lộ".to_string(),
            explanation: "Điều này thay đổi mọi thứ".to_string(),
            impact: "Nhân vật phải đối mặt với thực tế mới".to_string(),
            new_direction: "Câu chuyện đi theo hướng khác".to_string(),
        }
    }
}
