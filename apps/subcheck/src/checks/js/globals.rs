//! Globals of a browser page running modern ECMAScript.

pub const ES_GLOBALS: &[&str] = &[
    "AggregateError", "Array", "ArrayBuffer", "Atomics", "BigInt", "BigInt64Array",
    "BigUint64Array", "Boolean", "DataView", "Date", "Error", "EvalError", "FinalizationRegistry",
    "Float32Array", "Float64Array", "Function", "Infinity", "Int16Array", "Int32Array",
    "Int8Array", "Intl", "JSON", "Map", "Math", "NaN", "Number", "Object", "Promise", "Proxy",
    "RangeError", "ReferenceError", "Reflect", "RegExp", "Set", "SharedArrayBuffer", "String",
    "Symbol", "SyntaxError", "TypeError", "URIError", "Uint16Array", "Uint32Array", "Uint8Array",
    "Uint8ClampedArray", "WeakMap", "WeakRef", "WeakSet", "arguments", "decodeURI",
    "decodeURIComponent", "encodeURI", "encodeURIComponent", "escape", "eval", "globalThis",
    "isFinite", "isNaN", "parseFloat", "parseInt", "undefined", "unescape",
];

pub const BROWSER_GLOBALS: &[&str] = &[
    "AbortController", "AbortSignal", "Audio", "AudioContext", "Blob", "BroadcastChannel",
    "CSS", "CanvasRenderingContext2D", "Clipboard", "CustomEvent", "DOMParser", "DOMException",
    "DOMRect", "Document", "DocumentFragment", "DragEvent", "Element", "Event", "EventSource",
    "EventTarget", "File", "FileList", "FileReader", "FocusEvent", "FormData", "Geolocation",
    "HTMLAnchorElement", "HTMLButtonElement", "HTMLCanvasElement", "HTMLCollection",
    "HTMLDivElement", "HTMLElement", "HTMLFormElement", "HTMLImageElement", "HTMLInputElement",
    "HTMLSelectElement", "HTMLTextAreaElement", "Headers", "History", "IDBKeyRange", "Image",
    "ImageData", "InputEvent", "IntersectionObserver", "KeyboardEvent", "Location",
    "MediaQueryList", "MessageChannel", "MessageEvent", "MouseEvent", "MutationObserver",
    "Navigator", "Node", "NodeList", "Notification", "OffscreenCanvas", "Option", "Path2D",
    "Performance", "PointerEvent", "PopStateEvent", "ProgressEvent", "Range", "Request",
    "ResizeObserver", "Response", "Screen", "Selection", "ServiceWorker", "ShadowRoot",
    "SpeechSynthesisUtterance", "Storage", "StorageEvent", "SubmitEvent", "SVGElement", "Text",
    "TextDecoder", "TextEncoder", "Touch", "TouchEvent", "TransitionEvent", "UIEvent", "URL",
    "URLSearchParams", "WebSocket", "WheelEvent", "Window", "Worker", "XMLHttpRequest",
    "XMLSerializer", "addEventListener", "alert", "atob", "blur", "btoa", "caches",
    "cancelAnimationFrame", "cancelIdleCallback", "clearInterval", "clearTimeout", "close",
    "closed", "confirm", "console", "createImageBitmap", "crypto", "customElements",
    "devicePixelRatio", "dispatchEvent", "document", "event", "fetch", "focus", "frames",
    "getComputedStyle", "getSelection", "history", "indexedDB", "innerHeight", "innerWidth",
    "isSecureContext", "length", "localStorage", "location", "matchMedia", "moveBy", "moveTo",
    "name", "navigator", "onload", "onresize", "onscroll", "open", "opener", "origin",
    "outerHeight", "outerWidth", "pageXOffset", "pageYOffset", "parent", "performance",
    "postMessage", "print", "prompt", "queueMicrotask", "removeEventListener",
    "requestAnimationFrame", "requestIdleCallback", "resizeBy", "resizeTo", "screen", "screenX",
    "screenY", "scroll", "scrollBy", "scrollTo", "scrollX", "scrollY", "self",
    "sessionStorage", "setInterval", "setTimeout", "speechSynthesis", "status", "stop",
    "structuredClone", "top", "visualViewport", "window",
];

pub fn is_global(name: &str) -> bool {
    ES_GLOBALS.contains(&name) || BROWSER_GLOBALS.contains(&name)
}
