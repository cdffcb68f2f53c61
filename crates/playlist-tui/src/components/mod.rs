pub mod entry_list;
pub mod header;
pub mod now_playing;
