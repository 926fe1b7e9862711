//! Mascot element binding

/// The on-screen image the animator drives.
///
/// Surfaces implement this over whatever they render into (a DOM `<img>`,
/// a headless document node). Calls never fail: a surface that lost its
/// element simply ignores them.
pub trait MascotElement: Send {
    /// Swap the displayed image
    fn set_image(&mut self, src: &str);

    /// Add a CSS class
    fn add_class(&mut self, class: &str);

    /// Remove a CSS class
    fn remove_class(&mut self, class: &str);
}
