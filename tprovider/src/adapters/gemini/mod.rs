mod convert;
mod factory;
mod provider;
mod transport;
mod types;

pub use factory::GeminiProviderFactory;
pub use provider::GeminiProvider;
pub use transport::{GEMINI_BASE_URL, GeminiChunkStream, GeminiHttpTransport, GeminiTransport};
pub use types::{
    Candidate, Content, FunctionCall, FunctionDeclaration, FunctionResponse,
    GeminiGenerationConfig, GeminiTool, GenerateContentRequest, GenerateContentResponse, Part,
    UsageMetadata,
};
