use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{StoryToolSpec, genre_or_default};
use crate::ToolKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRequest {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub genre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    pub appearance: String,
    pub personality: String,
    pub background: String,
    pub skills: Vec<String>,
    pub motivation: String,
}

pub struct CreateCharacter;

impl StoryToolSpec for CreateCharacter {
    type Input = CharacterRequest;
    type Output = CharacterProfile;

    const KIND: ToolKind = ToolKind::CreateCharacter;
    const DESCRIPTION: &'static str =
        "Tạo nhân vật chi tiết cho câu chuyện với tính cách, ngoại hình và background";
    const FAILURE_MESSAGE: &'static str = "Không thể tạo nhân vật";

    fn input_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Tên nhân vật"},
                "role": {"type": "string", "description": "Vai trò trong câu chuyện (chính, phụ, phản diện)"},
                "genre": {"type": "string", "description": "Thể loại câu chuyện"}
            },
            "required": ["name", "role"]
        })
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "appearance": {"type": "string"},
                "personality": {"type": "string"},
                "background": {"type": "string"},
                "skills": {"type": "array", "items": {"type": "string"}},
                "motivation": {"type": "string"}
            },
            "required": ["name", "appearance", "personality", "background", "skills", "motivation"]
        })
    }

    fn prompt(input: &CharacterRequest) -> String {
        format!(
            "Tạo nhân vật chi tiết cho câu chuyện {genre}:\n\
             Tên: {name}\n\
             Vai trò: {role}\n\
             \n\
             Hãy tạo ra:\n\
             - Ngoại hình chi tiết\n\
             - Tính cách độc đáo\n\
             - Background thú vị\n\
             - Kỹ năng đặc biệt\n\
             - Động lực hành động\n\
             \n\
             Trả về JSON với các trường: name, appearance, personality, background, skills, motivation",
            genre = genre_or_default(&input.genre),
            name = input.name,
            role = input.role,
        )
    }

    fn fallback(input: &CharacterRequest) -> CharacterProfile {
        CharacterProfile {
            name: input.name.clone(),
            appearance: "Một nhân vật bí ẩn".to_string(),
            personality: "Thông minh và dũng cảm".to_string(),
            background: "Có quá khứ đầy bí ẩn".to_string(),
            skills: vec!["Thông minh".to_string(), "Dũng cảm".to_string()],
            motivation: "Tìm kiếm sự thật".to_string(),
        }
    }
}
