pub mod now_playing;
pub mod station_menu;
