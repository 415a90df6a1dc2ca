use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct BodyPortalProps {
    #[prop_or_default]
    pub children: Html,
}

/// Renders its children into `document.body` instead of the call site, so a
/// full-screen backdrop is never clipped by the board container.
#[function_component]
pub(crate) fn BodyPortal(props: &BodyPortalProps) -> Html {
    create_portal(props.children.clone(), gloo::utils::body().into())
}

/// Seeds the layout generator from JavaScript's `Math.random`.
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;

    let mut bytes = [0u8; 8];
    for byte in &mut bytes {
        *byte = (256.0 * random()) as u8;
    }
    u64::from_be_bytes(bytes)
}
