use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use dear_imgui_multiplex::backend::headless::{HeadlessBackend, HeadlessTextureFactory};
use dear_imgui_multiplex::{ContextManager, MouseCursor, ModuleManager, Settings};
use pretty_assertions::assert_eq;

fn module() -> ModuleManager<HeadlessBackend, HeadlessTextureFactory> {
    ModuleManager::new(
        HeadlessBackend::new(),
        HeadlessTextureFactory::default(),
        Settings::default(),
    )
    .unwrap()
}

#[test]
fn proxy_ticks_at_most_once_per_frame() {
    let mut manager = ContextManager::new(HeadlessBackend::new()).unwrap();
    let proxy = manager.get_or_create_proxy(Some("Game"));
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    proxy
        .borrow_mut()
        .on_draw()
        .add(move |_| seen.set(seen.get() + 1));

    manager.tick(0.016);
    let first = proxy.borrow().draw_data();
    for _ in 0..3 {
        proxy.borrow_mut().tick(0.016);
    }

    assert_eq!(calls.get(), 1);
    assert_eq!(proxy.borrow().gui().unwrap().frame_count(), 1);
    assert!(Arc::ptr_eq(&first, &proxy.borrow().draw_data()));

    manager.tick(0.016);
    assert_eq!(calls.get(), 2);
}

#[test]
fn failing_multi_context_listener_is_isolated() {
    let mut module = module();
    module.context_proxy(Some("Game"));
    module.context_proxy(Some("PIEContext1"));

    module.add_multi_context_delegate(|_| panic!("listener failure"));
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    module.add_multi_context_delegate(move |_| seen.set(seen.get() + 1));

    module.tick(0.016);
    assert_eq!(calls.get(), 3);

    // Every context still completed its frame
    for proxy in module.context_manager().proxies() {
        assert_eq!(proxy.borrow().last_frame(), Some(1));
        assert_eq!(proxy.borrow().mouse_cursor(), MouseCursor::Arrow);
    }

    module.tick(0.016);
    assert_eq!(calls.get(), 6);
}

#[test]
fn failing_context_listener_still_finishes_the_frame() {
    let mut module = module();
    module.add_context_delegate(Some("Game"), |_| panic!("listener failure"));
    let shared_calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&shared_calls);
    module.add_multi_context_delegate(move |ui| {
        seen.set(seen.get() + 1);
        ui.add_rect_filled([0.0, 0.0], [10.0, 10.0], 0xFFFF_FFFF);
    });
    let proxy = module.context_proxy(Some("Game"));
    proxy.borrow_mut().set_display_size([800.0, 600.0]);
    let before = proxy.borrow().draw_data();

    module.tick(0.016);

    // The default context runs the shared listener too
    assert_eq!(shared_calls.get(), 2);
    let proxy = proxy.borrow();
    assert_eq!(proxy.last_frame(), Some(1));
    let after = proxy.draw_data();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(after.batches().len(), 1);
    assert_eq!(after.display_size(), [800.0, 600.0]);
}

#[test]
fn captured_draw_data_is_a_snapshot() {
    let mut module = module();
    let width = Rc::new(Cell::new(10.0_f32));
    let size = Rc::clone(&width);
    module.add_context_delegate(Some("Game"), move |ui| {
        ui.add_rect_filled([0.0, 0.0], [size.get(), 10.0], 0xFFFF_FFFF);
    });
    let proxy = module.context_proxy(Some("Game"));
    proxy.borrow_mut().set_display_size([800.0, 600.0]);

    module.tick(0.016);
    let held = proxy.borrow().draw_data();
    let before = held.batches()[0].vertices[1].pos;
    assert_eq!(before, [10.0, 0.0]);

    width.set(50.0);
    module.tick(0.016);

    assert_eq!(held.batches()[0].vertices[1].pos, [10.0, 0.0]);
    let latest = proxy.borrow().draw_data();
    assert_eq!(latest.batches()[0].vertices[1].pos, [50.0, 0.0]);
    assert!(!Arc::ptr_eq(&held, &latest));
}

#[test]
fn display_size_and_cursor_reported_after_tick() {
    let mut module = module();
    let proxy = module.context_proxy(Some("Game"));
    assert_eq!(proxy.borrow().mouse_cursor(), MouseCursor::None);

    proxy.borrow_mut().set_display_size([800.0, 600.0]);
    module.tick(0.016);

    let proxy = proxy.borrow();
    assert_eq!(proxy.display_size(), [800.0, 600.0]);
    assert_eq!(proxy.mouse_cursor(), MouseCursor::Arrow);
    assert_eq!(proxy.draw_data().display_size(), [800.0, 600.0]);
}

#[test]
fn same_name_returns_same_proxy() {
    let mut module = module();
    let first = module.context_proxy(Some("Game"));
    let second = module.context_proxy(Some("Game"));
    assert!(Rc::ptr_eq(&first, &second));

    let default = module.context_proxy(None);
    assert!(Rc::ptr_eq(&default, &module.context_proxy(Some(""))));
    assert_eq!(module.context_manager().len(), 2);
}

#[test]
fn cursor_and_active_item_follow_last_frame() {
    let mut module = module();
    let active = Rc::new(Cell::new(true));
    let flag = Rc::clone(&active);
    module.add_context_delegate(None, move |ui| {
        ui.set_active_item(flag.get());
        ui.set_mouse_cursor(MouseCursor::TextInput);
    });

    module.tick(0.016);
    let proxy = module.context_proxy(None);
    assert!(proxy.borrow().has_active_item());
    assert_eq!(proxy.borrow().mouse_cursor(), MouseCursor::TextInput);

    active.set(false);
    module.tick(0.016);
    assert!(!proxy.borrow().has_active_item());
}
