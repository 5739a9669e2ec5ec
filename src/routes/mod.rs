pub mod admin;

pub mod auth;

pub mod evaluations;

pub mod questions;

pub mod recommendations;

pub mod results;

pub mod sections;

pub mod system;

pub mod users;

pub use admin::configure_admin_routes;
pub use auth::configure_auth_routes;
pub use evaluations::configure_evaluation_routes;
pub use questions::configure_question_routes;
pub use recommendations::configure_recommendation_routes;
pub use results::configure_result_routes;
pub use sections::configure_section_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;
