//! Design tokens for consistent UI spacing and sizing.

use gpui::px;

// Spacing (padding, margin, gap)

/// Extra small spacing (4px) - tight gaps, small padding
pub const SPACE_XS: gpui::Pixels = px(4.0);

/// Small spacing (6px) - compact padding
pub const SPACE_SM: gpui::Pixels = px(6.0);

/// Medium spacing (8px) - standard gaps
pub const SPACE_MD: gpui::Pixels = px(8.0);

/// Large spacing (12px) - section padding, larger gaps
pub const SPACE_LG: gpui::Pixels = px(12.0);

/// Extra large spacing (16px) - modal/dialog padding
pub const SPACE_XL: gpui::Pixels = px(16.0);

// Text sizes

/// Small text (10px) - secondary labels, hints
pub const TEXT_SM: gpui::Pixels = px(10.0);

/// Medium-small text (11px) - compact UI, button labels
pub const TEXT_MS: gpui::Pixels = px(11.0);

/// Medium text (12px) - default body text
pub const TEXT_MD: gpui::Pixels = px(12.0);

/// Extra large text (14px) - headings, modal titles
pub const TEXT_XL: gpui::Pixels = px(14.0);

// Border radius

/// Standard radius (4px) - buttons, inputs, cards
pub const RADIUS_STD: gpui::Pixels = px(4.0);

/// Large radius (8px) - modals, dialogs
pub const RADIUS_LG: gpui::Pixels = px(8.0);

// Widths

/// Standard modal width (medium)
pub const WIDTH_MODAL_MD: gpui::Pixels = px(450.0);
