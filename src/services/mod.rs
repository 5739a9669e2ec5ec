pub mod activity_logs;
pub mod auth;
pub mod evaluations;
pub mod questions;
pub mod recommendations;
pub mod results;
pub mod sections;
pub mod system;
pub mod users;

pub use activity_logs::ActivityLogService;
pub use auth::AuthService;
pub use evaluations::EvaluationService;
pub use questions::QuestionService;
pub use recommendations::RecommendationService;
pub use results::ResultService;
pub use sections::SectionService;
pub use system::SystemService;
pub use users::UserService;
