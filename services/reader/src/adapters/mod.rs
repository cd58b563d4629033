pub mod ai;
pub mod annotations;
pub mod api_client;
pub mod auth;
pub mod documents;
pub mod records;
pub mod speech;
pub mod storage;

pub use ai::HttpAiAdapter;
pub use annotations::HttpAnnotationAdapter;
pub use api_client::{ApiClient, AuthScheme};
pub use auth::HttpAuthAdapter;
pub use documents::HttpDocumentAdapter;
pub use speech::HttpSpeechAdapter;
pub use storage::{FileSessionStorage, MemorySessionStorage};
