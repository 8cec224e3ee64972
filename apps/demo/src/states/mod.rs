mod intro;
mod menu;

pub use intro::Intro;
pub use menu::Menu;

use stagehand_core::{Engine, Gamestate};

pub const INTRO: &str = "intro";
pub const MENU: &str = "menu";

pub fn register_all(engine: &mut Engine) {
    engine.register_gamestate(INTRO, || Box::new(Intro::new()) as Box<dyn Gamestate>);
    engine.register_gamestate(MENU, || Box::new(Menu::new()) as Box<dyn Gamestate>);
}
