//! Known CSS names used by the `*-no-unknown` rules.
//!
//! All lists are lowercase; callers strip vendor prefixes before lookup.

pub const AT_RULES: &[&str] = &[
    "charset", "color-profile", "container", "counter-style", "custom-media", "custom-selector",
    "document", "font-face", "font-feature-values", "font-palette-values", "import", "keyframes",
    "layer", "media", "namespace", "nest", "page", "property", "scope", "starting-style",
    "supports", "viewport", "annotation", "character-variant", "ornaments", "styleset",
    "stylistic", "swash", "bottom-center", "bottom-left", "bottom-left-corner", "bottom-right",
    "bottom-right-corner", "left-bottom", "left-middle", "left-top", "right-bottom",
    "right-middle", "right-top", "top-center", "top-left", "top-left-corner", "top-right",
    "top-right-corner", "position-try", "view-transition",
];

pub const MEDIA_FEATURES: &[&str] = &[
    "any-hover", "any-pointer", "aspect-ratio", "color", "color-gamut", "color-index",
    "device-aspect-ratio", "device-height", "device-posture", "device-width", "display-mode",
    "dynamic-range", "forced-colors", "grid", "height", "hover", "inverted-colors", "monochrome",
    "orientation", "overflow-block", "overflow-inline", "pointer", "prefers-color-scheme",
    "prefers-contrast", "prefers-reduced-data", "prefers-reduced-motion",
    "prefers-reduced-transparency", "resolution", "scan", "scripting", "update",
    "video-dynamic-range", "width", "min-device-pixel-ratio", "max-device-pixel-ratio",
    "device-pixel-ratio",
];

pub const UNITS: &[&str] = &[
    // relative lengths
    "em", "rem", "ex", "rex", "cap", "rcap", "ch", "rch", "ic", "ric", "lh", "rlh",
    // viewport and container
    "vw", "vh", "vi", "vb", "vmin", "vmax", "svw", "svh", "svi", "svb", "svmin", "svmax", "lvw",
    "lvh", "lvi", "lvb", "lvmin", "lvmax", "dvw", "dvh", "dvi", "dvb", "dvmin", "dvmax", "cqw",
    "cqh", "cqi", "cqb", "cqmin", "cqmax",
    // absolute lengths
    "px", "cm", "mm", "q", "in", "pt", "pc",
    // angles, time, frequency, resolution, flex
    "deg", "grad", "rad", "turn", "s", "ms", "hz", "khz", "dpi", "dpcm", "dppx", "x", "fr",
];

pub const PSEUDO_CLASSES: &[&str] = &[
    "active", "any-link", "autofill", "blank", "checked", "current", "default", "defined",
    "dir", "disabled", "empty", "enabled", "first", "first-child", "first-of-type",
    "focus", "focus-visible", "focus-within", "fullscreen", "future", "has", "host",
    "host-context", "hover", "in-range", "indeterminate", "invalid", "is", "lang", "last-child",
    "last-of-type", "left", "link", "local-link", "modal", "not", "nth-child", "nth-col",
    "nth-last-child", "nth-last-col", "nth-last-of-type", "nth-of-type", "only-child",
    "only-of-type", "optional", "out-of-range", "past", "paused", "picture-in-picture",
    "placeholder-shown", "playing", "popover-open", "read-only", "read-write", "required",
    "right", "root", "scope", "state", "target", "target-within", "user-invalid", "user-valid",
    "valid", "visited", "where", "open", "closed", "muted", "volume-locked", "seeking",
    "stalled", "buffering", "matches", "any", "corner-present", "decrement", "double-button",
    "end", "horizontal", "increment", "no-button", "single-button", "start", "vertical",
    "window-inactive",
];

/// Pseudo-elements; the first four are also accepted with a single colon.
pub const PSEUDO_ELEMENTS: &[&str] = &[
    "before", "after", "first-line", "first-letter", "backdrop", "cue", "cue-region",
    "file-selector-button", "grammar-error", "highlight", "marker", "part", "placeholder",
    "selection", "slotted", "spelling-error", "target-text", "view-transition",
    "view-transition-group", "view-transition-image-pair", "view-transition-new",
    "view-transition-old", "details-content", "scroll-marker", "scroll-marker-group",
    "column", "checkmark", "picker", "picker-icon",
];

pub const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

pub const TYPE_SELECTORS: &[&str] = &[
    // html
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col",
    "colgroup", "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt",
    "em", "embed", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "head", "header", "hgroup", "hr", "html", "i", "iframe", "img", "input", "ins",
    "kbd", "label", "legend", "li", "link", "main", "map", "mark", "menu", "meta", "meter", "nav",
    "noscript", "object", "ol", "optgroup", "option", "output", "p", "param", "picture", "pre",
    "progress", "q", "rp", "rt", "ruby", "s", "samp", "script", "search", "section", "select",
    "slot", "small", "source", "span", "strong", "style", "sub", "summary", "sup", "table",
    "tbody", "td", "template", "textarea", "tfoot", "th", "thead", "time", "title", "tr",
    "track", "u", "ul", "var", "video", "wbr",
    // obsolete but still styled
    "acronym", "big", "center", "font", "frame", "frameset", "marquee", "strike", "tt", "nobr",
    // svg and mathml
    "svg", "g", "path", "circle", "ellipse", "line", "polyline", "polygon", "rect", "text",
    "tspan", "textpath", "defs", "use", "symbol", "marker", "mask", "pattern", "clippath",
    "lineargradient", "radialgradient", "stop", "filter", "foreignobject", "image", "desc",
    "math", "mi", "mn", "mo", "mrow", "msup", "msub", "mfrac", "msqrt",
];

pub const PROPERTIES: &[&str] = &[
    "accent-color", "align-content", "align-items", "align-self", "alignment-baseline", "all",
    "anchor-name", "animation", "animation-composition", "animation-delay", "animation-direction",
    "animation-duration", "animation-fill-mode", "animation-iteration-count", "animation-name",
    "animation-play-state", "animation-range", "animation-timeline", "animation-timing-function",
    "appearance", "aspect-ratio", "backdrop-filter", "backface-visibility", "background",
    "background-attachment", "background-blend-mode", "background-clip", "background-color",
    "background-image", "background-origin", "background-position", "background-position-x",
    "background-position-y", "background-repeat", "background-size", "baseline-shift",
    "block-size", "border", "border-block", "border-block-color", "border-block-end",
    "border-block-end-color", "border-block-end-style", "border-block-end-width",
    "border-block-start", "border-block-start-color", "border-block-start-style",
    "border-block-start-width", "border-block-style", "border-block-width", "border-bottom",
    "border-bottom-color", "border-bottom-left-radius", "border-bottom-right-radius",
    "border-bottom-style", "border-bottom-width", "border-collapse", "border-color",
    "border-end-end-radius", "border-end-start-radius", "border-image", "border-image-outset",
    "border-image-repeat", "border-image-slice", "border-image-source", "border-image-width",
    "border-inline", "border-inline-color", "border-inline-end", "border-inline-end-color",
    "border-inline-end-style", "border-inline-end-width", "border-inline-start",
    "border-inline-start-color", "border-inline-start-style", "border-inline-start-width",
    "border-inline-style", "border-inline-width", "border-left", "border-left-color",
    "border-left-style", "border-left-width", "border-radius", "border-right",
    "border-right-color", "border-right-style", "border-right-width", "border-spacing",
    "border-start-end-radius", "border-start-start-radius", "border-style", "border-top",
    "border-top-color", "border-top-left-radius", "border-top-right-radius", "border-top-style",
    "border-top-width", "border-width", "bottom", "box-decoration-break", "box-shadow",
    "box-sizing", "break-after", "break-before", "break-inside", "caption-side", "caret-color",
    "clear", "clip", "clip-path", "clip-rule", "color", "color-interpolation",
    "color-interpolation-filters", "color-scheme", "column-count", "column-fill", "column-gap",
    "column-rule", "column-rule-color", "column-rule-style", "column-rule-width", "column-span",
    "column-width", "columns", "contain", "contain-intrinsic-block-size",
    "contain-intrinsic-height", "contain-intrinsic-inline-size", "contain-intrinsic-size",
    "contain-intrinsic-width", "container", "container-name", "container-type", "content",
    "content-visibility", "counter-increment", "counter-reset", "counter-set", "cursor", "cx",
    "cy", "d", "direction", "display", "dominant-baseline", "empty-cells", "field-sizing",
    "fill", "fill-opacity", "fill-rule", "filter", "flex", "flex-basis", "flex-direction",
    "flex-flow", "flex-grow", "flex-shrink", "flex-wrap", "float", "flood-color",
    "flood-opacity", "font", "font-display", "font-family", "font-feature-settings",
    "font-kerning", "font-language-override", "font-optical-sizing", "font-palette",
    "font-size", "font-size-adjust", "font-stretch", "font-style", "font-synthesis",
    "font-synthesis-small-caps", "font-synthesis-style", "font-synthesis-weight",
    "font-variant", "font-variant-alternates", "font-variant-caps", "font-variant-east-asian",
    "font-variant-emoji", "font-variant-ligatures", "font-variant-numeric",
    "font-variant-position", "font-variation-settings", "font-weight", "forced-color-adjust",
    "gap", "grid", "grid-area", "grid-auto-columns", "grid-auto-flow", "grid-auto-rows",
    "grid-column", "grid-column-end", "grid-column-gap", "grid-column-start", "grid-gap",
    "grid-row", "grid-row-end", "grid-row-gap", "grid-row-start", "grid-template",
    "grid-template-areas", "grid-template-columns", "grid-template-rows", "hanging-punctuation",
    "height", "hyphenate-character", "hyphens", "image-orientation", "image-rendering",
    "inline-size", "inset", "inset-block", "inset-block-end", "inset-block-start",
    "inset-inline", "inset-inline-end", "inset-inline-start", "isolation", "justify-content",
    "justify-items", "justify-self", "left", "letter-spacing", "lighting-color", "line-break",
    "line-clamp", "line-height", "list-style", "list-style-image", "list-style-position",
    "list-style-type", "margin", "margin-block", "margin-block-end", "margin-block-start",
    "margin-bottom", "margin-inline", "margin-inline-end", "margin-inline-start", "margin-left",
    "margin-right", "margin-top", "marker", "marker-end", "marker-mid", "marker-start", "mask",
    "mask-border", "mask-clip", "mask-composite", "mask-image", "mask-mode", "mask-origin",
    "mask-position", "mask-repeat", "mask-size", "mask-type", "math-depth", "math-style",
    "max-block-size", "max-height", "max-inline-size", "max-width", "min-block-size",
    "min-height", "min-inline-size", "min-width", "mix-blend-mode", "object-fit",
    "object-position", "offset", "offset-anchor", "offset-distance", "offset-path",
    "offset-position", "offset-rotate", "opacity", "order", "orphans", "outline",
    "outline-color", "outline-offset", "outline-style", "outline-width", "overflow",
    "overflow-anchor", "overflow-block", "overflow-clip-margin", "overflow-inline",
    "overflow-wrap", "overflow-x", "overflow-y", "overscroll-behavior",
    "overscroll-behavior-block", "overscroll-behavior-inline", "overscroll-behavior-x",
    "overscroll-behavior-y", "padding", "padding-block", "padding-block-end",
    "padding-block-start", "padding-bottom", "padding-inline", "padding-inline-end",
    "padding-inline-start", "padding-left", "padding-right", "padding-top", "page",
    "page-break-after", "page-break-before", "page-break-inside", "paint-order", "perspective",
    "perspective-origin", "place-content", "place-items", "place-self", "pointer-events",
    "position", "position-anchor", "position-area", "position-try", "print-color-adjust",
    "quotes", "r", "resize", "right", "rotate", "row-gap", "ruby-align", "ruby-position", "rx",
    "ry", "scale", "scroll-behavior", "scroll-margin", "scroll-margin-block",
    "scroll-margin-block-end", "scroll-margin-block-start", "scroll-margin-bottom",
    "scroll-margin-inline", "scroll-margin-inline-end", "scroll-margin-inline-start",
    "scroll-margin-left", "scroll-margin-right", "scroll-margin-top", "scroll-padding",
    "scroll-padding-block", "scroll-padding-block-end", "scroll-padding-block-start",
    "scroll-padding-bottom", "scroll-padding-inline", "scroll-padding-inline-end",
    "scroll-padding-inline-start", "scroll-padding-left", "scroll-padding-right",
    "scroll-padding-top", "scroll-snap-align", "scroll-snap-stop", "scroll-snap-type",
    "scroll-timeline", "scrollbar-color", "scrollbar-gutter", "scrollbar-width",
    "shape-image-threshold", "shape-margin", "shape-outside", "shape-rendering", "speak",
    "src", "stop-color", "stop-opacity", "stroke", "stroke-dasharray", "stroke-dashoffset",
    "stroke-linecap", "stroke-linejoin", "stroke-miterlimit", "stroke-opacity", "stroke-width",
    "tab-size", "table-layout", "text-align", "text-align-last", "text-anchor",
    "text-combine-upright", "text-decoration", "text-decoration-color", "text-decoration-line",
    "text-decoration-skip-ink", "text-decoration-style", "text-decoration-thickness",
    "text-emphasis", "text-emphasis-color", "text-emphasis-position", "text-emphasis-style",
    "text-indent", "text-justify", "text-orientation", "text-overflow", "text-rendering",
    "text-shadow", "text-size-adjust", "text-transform", "text-underline-offset",
    "text-underline-position", "text-wrap", "text-wrap-mode", "text-wrap-style", "top",
    "touch-action", "transform", "transform-box", "transform-origin", "transform-style",
    "transition", "transition-behavior", "transition-delay", "transition-duration",
    "transition-property", "transition-timing-function", "translate", "unicode-bidi",
    "unicode-range", "user-select", "vector-effect", "vertical-align", "view-timeline",
    "view-transition-name", "visibility", "white-space", "white-space-collapse", "widows",
    "width", "will-change", "word-break", "word-spacing", "word-wrap", "writing-mode", "x", "y",
    "z-index", "zoom",
    // @font-face, @page and @property descriptors
    "font-named-instance", "size-adjust", "ascent-override", "descent-override",
    "line-gap-override", "size", "syntax", "inherits", "initial-value", "bleed", "marks",
];

/// Shorthand property → longhands it resets.
pub const SHORTHANDS: &[(&str, &[&str])] = &[
    ("animation", &["animation-name", "animation-duration", "animation-timing-function", "animation-delay", "animation-iteration-count", "animation-direction", "animation-fill-mode", "animation-play-state"]),
    ("background", &["background-image", "background-size", "background-position", "background-repeat", "background-origin", "background-clip", "background-attachment", "background-color"]),
    ("border", &["border-top-width", "border-bottom-width", "border-left-width", "border-right-width", "border-top-style", "border-bottom-style", "border-left-style", "border-right-style", "border-top-color", "border-bottom-color", "border-left-color", "border-right-color", "border-width", "border-style", "border-color"]),
    ("border-top", &["border-top-width", "border-top-style", "border-top-color"]),
    ("border-right", &["border-right-width", "border-right-style", "border-right-color"]),
    ("border-bottom", &["border-bottom-width", "border-bottom-style", "border-bottom-color"]),
    ("border-left", &["border-left-width", "border-left-style", "border-left-color"]),
    ("border-width", &["border-top-width", "border-bottom-width", "border-left-width", "border-right-width"]),
    ("border-style", &["border-top-style", "border-bottom-style", "border-left-style", "border-right-style"]),
    ("border-color", &["border-top-color", "border-bottom-color", "border-left-color", "border-right-color"]),
    ("border-radius", &["border-top-right-radius", "border-top-left-radius", "border-bottom-right-radius", "border-bottom-left-radius"]),
    ("border-image", &["border-image-source", "border-image-slice", "border-image-width", "border-image-outset", "border-image-repeat"]),
    ("columns", &["column-width", "column-count"]),
    ("column-rule", &["column-rule-width", "column-rule-style", "column-rule-color"]),
    ("flex", &["flex-grow", "flex-shrink", "flex-basis"]),
    ("flex-flow", &["flex-direction", "flex-wrap"]),
    ("font", &["font-style", "font-variant", "font-weight", "font-stretch", "font-size", "font-family", "line-height"]),
    ("gap", &["row-gap", "column-gap"]),
    ("grid", &["grid-template-rows", "grid-template-columns", "grid-template-areas", "grid-auto-rows", "grid-auto-columns", "grid-auto-flow"]),
    ("grid-area", &["grid-row-start", "grid-column-start", "grid-row-end", "grid-column-end"]),
    ("grid-column", &["grid-column-start", "grid-column-end"]),
    ("grid-row", &["grid-row-start", "grid-row-end"]),
    ("grid-template", &["grid-template-columns", "grid-template-rows", "grid-template-areas"]),
    ("inset", &["top", "right", "bottom", "left"]),
    ("list-style", &["list-style-type", "list-style-position", "list-style-image"]),
    ("margin", &["margin-top", "margin-bottom", "margin-left", "margin-right"]),
    ("mask", &["mask-image", "mask-mode", "mask-position", "mask-size", "mask-repeat", "mask-origin", "mask-clip", "mask-composite"]),
    ("outline", &["outline-color", "outline-style", "outline-width"]),
    ("overflow", &["overflow-x", "overflow-y"]),
    ("padding", &["padding-top", "padding-bottom", "padding-left", "padding-right"]),
    ("place-content", &["align-content", "justify-content"]),
    ("place-items", &["align-items", "justify-items"]),
    ("place-self", &["align-self", "justify-self"]),
    ("text-decoration", &["text-decoration-color", "text-decoration-style", "text-decoration-line"]),
    ("transition", &["transition-delay", "transition-duration", "transition-property", "transition-timing-function"]),
];

/// Name with a leading vendor prefix removed, e.g. `-webkit-box` → `box`.
pub fn unprefixed(name: &str) -> &str {
    if let Some(rest) = name.strip_prefix('-') {
        if let Some(dash) = rest.find('-') {
            if dash > 0 && !rest.starts_with('-') {
                return &rest[dash + 1..];
            }
        }
    }
    name
}

pub fn has_vendor_prefix(name: &str) -> bool {
    unprefixed(name).len() != name.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_prefix_handling() {
        assert_eq!(unprefixed("-webkit-keyframes"), "keyframes");
        assert_eq!(unprefixed("--custom"), "--custom");
        assert_eq!(unprefixed("color"), "color");
        assert!(has_vendor_prefix("-moz-appearance"));
        assert!(!has_vendor_prefix("--main-color"));
    }
}
