use static_assertions::{assert_impl_all, assert_not_impl_any};

use dear_imgui_multiplex::backend::headless::{
    HeadlessBackend, HeadlessContext, HeadlessTextureFactory, HeadlessUi,
};

// Compile-time checks for Send/Sync markers
#[test]
fn proxy_and_manager_thread_markers() {
    // Proxies and everything that drives them stay on the update thread
    assert_not_impl_any!(dear_imgui_multiplex::ContextProxy<HeadlessContext>: Send, Sync);
    assert_not_impl_any!(dear_imgui_multiplex::ContextManager<HeadlessBackend>: Send, Sync);
    assert_not_impl_any!(
        dear_imgui_multiplex::ModuleManager<HeadlessBackend, HeadlessTextureFactory>: Send, Sync
    );
    assert_not_impl_any!(dear_imgui_multiplex::Surface<HeadlessContext>: Send, Sync);
    assert_not_impl_any!(dear_imgui_multiplex::MulticastDelegate<HeadlessUi>: Send, Sync);
    assert_not_impl_any!(dear_imgui_multiplex::FontAtlas: Sync);

    // Captured draw output may be handed to a render thread
    assert_impl_all!(dear_imgui_multiplex::DrawDataBuffer: Send, Sync);
    assert_impl_all!(std::sync::Arc<dear_imgui_multiplex::DrawDataBuffer>: Send, Sync);
    assert_impl_all!(dear_imgui_multiplex::InputState: Send, Sync);
}
