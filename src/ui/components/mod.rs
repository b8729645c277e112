pub mod interview_page;
pub mod problem_panel;
pub mod session_controls;
pub mod status_panel;
pub mod transcript_panel;

pub use interview_page::InterviewPage;
pub use problem_panel::ProblemPanel;
pub use session_controls::SessionControls;
pub use status_panel::StatusPanel;
pub use transcript_panel::TranscriptPanel;
