mod notes;

pub use notes::draw_note_list;
