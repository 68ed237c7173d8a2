pub mod chat_loop;
pub mod markdown;
pub mod renderer;
pub mod theme;
