use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{StoryToolSpec, genre_or_default};
use crate::ToolKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRequest {
    pub timeperiod: String,
    pub location: String,
    #[serde(default)]
    pub genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingProfile {
    pub timeperiod: String,
    pub location: String,
    pub environment: String,
    pub culture: String,
    pub technology: String,
    pub challenges: Vec<String>,
}

pub struct CreateSetting;

impl StoryToolSpec for CreateSetting {
    type Input = SettingRequest;
    type Output = SettingProfile;

    const KIND: ToolKind = ToolKind::CreateSetting;
    const DESCRIPTION: &'static str =
        "Tạo bối cảnh chi tiết cho câu chuyện bao gồm thời gian, địa điểm và môi trường";
    const FAILURE_MESSAGE: &'static str = "Không thể tạo bối cảnh";

    fn input_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "timeperiod": {"type": "string", "description": "Thời đại (hiện đại, cổ đại, tương lai, etc.)"},
                "location": {"type": "string", "description": "Địa điểm chính"},
                "genre": {"type": "string", "description": "Thể loại câu chuyện"}
            },
            "required": ["timeperiod", "location"]
        })
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "timeperiod": {"type": "string"},
                "location": {"type": "string"},
                "environment": {"type": "string"},
                "culture": {"type": "string"},
                "technology": {"type": "string"},
                "challenges": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["timeperiod", "location", "environment", "culture", "technology", "challenges"]
        })
    }

    fn prompt(input: &SettingRequest) -> String {
        format!(
            "Tạo bối cảnh chi tiết cho câu chuyện {genre}:\n\
             Thời đại: {timeperiod}\n\
             Địa điểm: {location}\n\
             \n\
             Hãy mô tả:\n\
             - Môi trường sống\n\
             - Văn hóa xã hội\n\
             - Trình độ công nghệ\n\
             - Thử thách và nguy hiểm\n\
             \n\
             Trả về JSON với các trường: timeperiod, location, environment, culture, technology, challenges",
            genre = genre_or_default(&input.genre),
            timeperiod = input.timeperiod,
            location = input.location,
        )
    }

    fn fallback(input: &SettingRequest) -> SettingProfile {
        SettingProfile {
            timeperiod: input.timeperiod.clone(),
            location: input.location.clone(),
            environment: "Một thế giới đầy bí ẩn".to_string(),
            culture: "Văn hóa phong phú".to_string(),
            technology: "Công nghệ phù hợp thời đại".to_string(),
            challenges: vec!["Khó khăn".to_string(), "Thử thách".to_string()],
        }
    }
}
