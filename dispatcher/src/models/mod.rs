pub mod binding;
pub mod scene_event;
