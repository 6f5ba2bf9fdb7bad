//! Test fixtures - reusable script sources for scenario tests.

/// A page template importing a shared helper
pub const PAGE_IMPORTING_HELPER: &str = r#"const { title } = require("./_includes/helper");
module.exports = (data) => `<h1>${title(data)}</h1>`;
"#;

/// A helper importing a formatting module
pub const HELPER_IMPORTING_FMT: &str = r#"import { upper } from "./fmt.js";
export const title = (data) => upper(data.title);
"#;

/// A leaf module without imports
pub const FMT_LEAF: &str = r#"export const upper = (s) => s.toUpperCase();
"#;

/// A standalone page template
pub const STANDALONE_PAGE: &str = r#"module.exports = () => "<p>standalone</p>";
"#;
