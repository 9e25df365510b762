//! Fixed Vietnamese texts used by the coordinator.

use crate::{StoryLength, StoryResponse};

pub const SYSTEM_PROMPT: &str = "Bạn là TomiChat, một trợ lý AI thông minh và thân thiện chuyên giúp người dùng tạo ra những câu chuyện thú vị.

Đặc điểm của bạn:
- Luôn trả lời bằng tiếng Việt
- Có khả năng sáng tạo cao trong việc kể chuyện
- Thân thiện, nhiệt tình và hữu ích
- Có thể giúp phát triển ý tưởng thành câu chuyện hoàn chỉnh
- Biết cách tạo ra các nhân vật, tình huống và cốt truyện hấp dẫn

Nhiệm vụ của bạn:
- Giúp người dùng tạo ra các câu chuyện từ ý tưởng ban đầu
- Đưa ra gợi ý sáng tạo cho cốt truyện
- Phát triển nhân vật và bối cảnh
- Tạo ra nội dung hấp dẫn và phù hợp với mọi lứa tuổi

Hãy luôn giữ thái độ tích cực và khuyến khích sự sáng tạo của người dùng!";

pub const NOT_CONFIGURED_GUIDANCE: &str = "❌ Xin lỗi, TomiChat chưa được cấu hình đúng cách.

Để sử dụng TomiChat, bạn cần:
1. Tạo Google AI API key tại: https://makersuite.google.com/app/apikey
2. Sử dụng Command Palette: \"TomiChat: Thiết lập API Key\"
3. Hoặc thiết lập trong VS Code Settings

💡 Tip: Sử dụng command \"TomiChat: Thiết lập API Key\" để thiết lập nhanh!";

pub const NOT_CONFIGURED_SUGGESTIONS: [&str; 3] = [
    "Hướng dẫn cài đặt API key",
    "Mở VS Code Settings",
    "Sử dụng chế độ demo",
];

pub const APOLOGY: &str = "Xin lỗi, tôi đang gặp một chút vấn đề. Bạn có thể thử lại không? 🤔";

pub const APOLOGY_SUGGESTIONS: [&str; 3] = [
    "Thử lại tin nhắn",
    "Kiểm tra kết nối mạng",
    "Báo cáo lỗi",
];

pub const STORY_FAILURE_MESSAGE: &str = "Không thể tạo câu chuyện. Vui lòng thử lại!";

pub const DEFAULT_STORY_GENRE: &str = "phiêu lưu";

pub const LONG_STORY_MAX_TOKENS: u32 = 2000;

pub(crate) fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

pub fn story_length_prompt(length: StoryLength) -> &'static str {
    match length {
        StoryLength::Short => "một câu chuyện ngắn (200-300 từ)",
        StoryLength::Medium => "một câu chuyện vừa phải (500-700 từ)",
        StoryLength::Long => "một câu chuyện dài (1000-1500 từ)",
    }
}

pub fn story_prompt(idea: &str, genre: &str, length: StoryLength) -> String {
    format!(
        "Dựa trên ý tưởng: \"{idea}\"\n\
         Thể loại: {genre}\n\
         Hãy tạo ra {length} với:\n\
         - Tiêu đề hấp dẫn\n\
         - Cốt truyện rõ ràng với khởi đầu, phát triển và kết thúc\n\
         - Nhân vật sinh động\n\
         - Bài học ý nghĩa (nếu phù hợp)\n\
         \n\
         Trả về kết quả theo định dạng JSON với các trường: title, story, characters, moral.",
        length = story_length_prompt(length),
    )
}

pub fn story_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "title": {"type": "string"},
            "story": {"type": "string"},
            "characters": {"type": "array", "items": {"type": "string"}},
            "moral": {"type": "string"}
        },
        "required": ["title", "story", "characters"]
    })
}

/// Returned when story generation is requested without credentials.
pub fn story_not_configured() -> StoryResponse {
    StoryResponse {
        title: "Không thể tạo câu chuyện".to_string(),
        story: "Xin lỗi, TomiChat chưa được cấu hình đúng cách. Vui lòng thiết lập Google AI API key để sử dụng tính năng này.".to_string(),
        characters: Vec::new(),
        moral: Some("Hãy luôn chuẩn bị kỹ lưỡng trước khi bắt đầu một cuộc phiêu lưu!".to_string()),
    }
}

/// Returned when the model answers but not with a usable story.
pub fn story_fallback() -> StoryResponse {
    StoryResponse {
        title: "Câu chuyện từ ý tưởng của bạn".to_string(),
        story: "Xin lỗi, tôi không thể tạo câu chuyện lúc này. Hãy thử lại sau!".to_string(),
        characters: Vec::new(),
        moral: None,
    }
}
