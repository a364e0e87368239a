//! The lecture-traversal and playback-completion engine.
//!
//! Everything in this module is written against the portal's specific DOM
//! structure; the markup anchors below are the full list of page details the
//! engine depends on.

pub mod auth;
pub mod catalog;
pub mod finish;
pub mod model;
pub mod player;
pub mod runner;

// Login form.
pub const LOGIN_ID_FIELD: &str = "username";
pub const LOGIN_PW_FIELD: &str = "password";

// Progress page: subject tree.
pub const PROGRESS_ROOT_CLASS: &str = "lecture-progress";
pub const SUBJECT_ITEM_CLASS: &str = "lecture-progress-item";
pub const SUBJECT_INFO_CLASS: &str = "lecture-info";
pub const SUBJECT_TOGGLE_CLASS: &str = "btn-toggle";
pub const PROGRESS_BADGE_CLASS: &str = "lecture-per";
pub const PROGRESS_VALUE_CLASS: &str = "value";
pub const SUBJECT_BODY_CLASS: &str = "lecture-progress-item-body";
pub const LECTURE_LIST_CLASS: &str = "lecture-list";
pub const LECTURE_ROW_CLASS: &str = "clearfix";
pub const LECTURE_TITLE_CLASS: &str = "lecture-title";

// Lecture row state: the anchor inside `lecture-list-in` carries the
// completion marker classes; rows without it show a waiting badge instead.
pub const LECTURE_STATE_CLASS: &str = "lecture-list-in";
pub const WAITING_MARKER_CLASS: &str = "con-waiting";
pub const STATE_BASE_CLASS: &str = "ch";
pub const STATE_DONE_CLASS: &str = "on";

// Player tab. The video widget lives in an embedded frame; the overlay is
// hidden once real playback starts.
pub const PLAYER_FRAME_ID: &str = "ifrmVODPlayer_0";
pub const RESUME_CONTROL_ID: &str = "wp_elearning_seek";
pub const PLAY_CONTROL_ID: &str = "wp_elearning_play";
pub const PLAYING_OVERLAY_ID: &str = "comment_player0";
pub const PLAYER_SURFACE_ID: &str = "player0";
pub const SPEED_MENU_ID: &str = "currentSpeedTitle";
pub const FASTEST_SPEED_ID: &str = "opSpeed_20";
pub const TOTAL_TIME_XPATH: &str =
    r#"//*[@id="wp-controls-outer-controlbar"]/div[2]/div[2]/div/div/div[3]/span"#;
pub const POSITION_XPATH: &str =
    r#"//*[@id="wp-controls-outer-controlbar"]/div[2]/div[2]/div/div/div[1]/span"#;
pub const FINISH_BUTTON_XPATH: &str = r#"//*[@id="top"]/div[2]/button"#;
