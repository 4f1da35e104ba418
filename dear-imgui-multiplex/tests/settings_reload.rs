use std::cell::Cell;
use std::rc::Rc;

use dear_imgui_multiplex::backend::headless::{HeadlessBackend, HeadlessTextureFactory};
use dear_imgui_multiplex::{
    DefaultInputHandler, EventReply, GamepadKey, InputHandler, InputSettings, Key, KeyEvent,
    ModuleManager, MouseCursor, NavInput, Settings,
};

type TestModule = ModuleManager<HeadlessBackend, HeadlessTextureFactory>;

fn counting_module(created: &Rc<Cell<u32>>) -> TestModule {
    let counter = Rc::clone(created);
    ModuleManager::new(
        HeadlessBackend::new(),
        HeadlessTextureFactory::default(),
        Settings::default(),
    )
    .unwrap()
    .with_input_handler_factory(move |settings: &InputSettings| -> Box<dyn InputHandler> {
        counter.set(counter.get() + 1);
        Box::new(DefaultInputHandler::new(settings))
    })
}

#[test]
fn settings_change_rebuilds_handler_on_next_event() {
    let created = Rc::new(Cell::new(0));
    let mut module = counting_module(&created);
    let mut surface = module.create_surface(None);
    surface.on_focus_received();
    assert_eq!(created.get(), 1);

    assert_eq!(
        surface.on_key_down(&KeyEvent::new(Key::GraveAccent)),
        EventReply::Unhandled
    );
    assert_eq!(created.get(), 1);

    module
        .set_settings(Settings {
            input: InputSettings {
                console_keys: vec![Key::F1],
                ..InputSettings::default()
            },
            ..Settings::default()
        })
        .unwrap();
    assert_eq!(created.get(), 1);

    assert_eq!(
        surface.on_key_down(&KeyEvent::new(Key::GraveAccent)),
        EventReply::Handled
    );
    assert_eq!(created.get(), 2);
    assert_eq!(
        surface.on_key_down(&KeyEvent::new(Key::F1)),
        EventReply::Unhandled
    );
    assert_eq!(created.get(), 2);
}

#[test]
fn navigation_switches_apply_to_existing_contexts() {
    let created = Rc::new(Cell::new(0));
    let mut module = counting_module(&created);
    let mut surface = module.create_surface(Some("Game"));
    surface.on_focus_received();

    let confirm = KeyEvent::new(GamepadKey::FaceButtonBottom);
    assert_eq!(surface.on_key_down(&confirm), EventReply::Unhandled);

    module
        .set_settings(Settings {
            input: InputSettings {
                gamepad_navigation: true,
                ..InputSettings::default()
            },
            ..Settings::default()
        })
        .unwrap();

    assert_eq!(surface.on_key_down(&confirm), EventReply::Handled);
    module.tick(0.016);
    let proxy = module.context_proxy(Some("Game"));
    let seen = proxy.borrow().gui().unwrap().last_input().unwrap().clone();
    assert_eq!(seen.nav_inputs[NavInput::Activate.index()], 1.0);
}

#[test]
fn debug_overlay_toggles_at_runtime() {
    let created = Rc::new(Cell::new(0));
    let mut module = counting_module(&created);
    let _surface = module.create_surface(Some("Game"));
    let proxy = module.context_proxy(Some("Game"));

    module.tick(0.016);
    assert!(proxy.borrow().gui().unwrap().debug_lines().is_empty());

    module
        .set_settings(Settings {
            debug_surface: true,
            ..Settings::default()
        })
        .unwrap();
    module.tick(0.016);

    let proxy = proxy.borrow();
    let lines = proxy.gui().unwrap().debug_lines();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].ends_with("context 'Game'"));
    assert_eq!(lines[1], "Input mode: None");
}

#[test]
fn draw_cursor_setting_moves_cursor_to_gui() {
    let created = Rc::new(Cell::new(0));
    let mut module = counting_module(&created);
    let mut surface = module.create_surface(None);
    surface.on_mouse_enter(&dear_imgui_multiplex::PointerEvent::new([1.0, 1.0]));
    module.tick(0.016);
    assert_eq!(surface.cursor_query(), MouseCursor::Arrow);

    module
        .set_settings(Settings {
            draw_mouse_cursor: true,
            ..Settings::default()
        })
        .unwrap();
    assert_eq!(surface.cursor_query(), MouseCursor::None);
}
