//! In-page scripts backing element handles
//!
//! Matched nodes are stamped with a reference attribute; every later
//! element operation looks the node up again by that reference. A missing
//! node means the handle is stale.

use action_primitives::Query;
use serde::Deserialize;
use serde_json::{json, Value};

pub(crate) const REF_ATTRIBUTE: &str = "data-evalfill-ref";

/// Node stamped by [`find_all`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct NodeRef {
    #[serde(rename = "ref")]
    pub reference: String,
    pub label: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FindOutcome {
    #[serde(default)]
    pub refs: Vec<NodeRef>,
    #[serde(default)]
    pub invalid: Option<String>,
    #[serde(default)]
    pub stale: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ElementOutcome<T> {
    #[serde(default)]
    pub stale: bool,
    pub value: Option<T>,
}

/// Hit-test result for a native click
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ClickTarget {
    pub x: f64,
    pub y: f64,
    pub hit: bool,
    #[serde(default)]
    pub blocker: Option<String>,
}

fn literal(value: impl Into<Value>) -> String {
    value.into().to_string()
}

/// Expression yielding this document's token, created on first use.
/// A navigation replaces `window`, so the next document gets a fresh one.
const DOCUMENT_TOKEN: &str = "(window.__evalfillDoc = window.__evalfillDoc || \
(Math.floor(performance.timeOrigin).toString(36) + Math.random().toString(36).slice(2, 8)))";

/// Expression yielding the referenced node, or `null` when it is gone or
/// was stamped in another document
fn lookup(reference: &str) -> String {
    format!(
        "((ref) => ref.startsWith({token} + ':') ? document.querySelector('[{attr}=' + JSON.stringify(ref) + ']') : null)({reference})",
        token = DOCUMENT_TOKEN,
        attr = REF_ATTRIBUTE,
        reference = literal(reference)
    )
}

/// Document token part of a reference
pub(crate) fn reference_document(reference: &str) -> Option<&str> {
    reference
        .split_once(':')
        .map(|(document, _)| document)
        .filter(|document| !document.is_empty())
}

/// Evaluate `query` below the document or below the node `scope`
pub(crate) fn find_all(scope: Option<&str>, query: &Query) -> String {
    let root = match scope {
        Some(reference) => lookup(reference),
        None => "document".to_string(),
    };
    format!(
        r##"(() => {{
  const attr = {attr};
  const doc = {token};
  const root = {root};
  if (!root) return {{ stale: true }};
  const query = {query};
  let nodes = [];
  try {{
    if (query.css !== undefined) {{
      nodes = Array.from(root.querySelectorAll(query.css));
    }} else if (query.xpath !== undefined) {{
      const snap = document.evaluate(query.xpath, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
      for (let i = 0; i < snap.snapshotLength; i++) {{
        const node = snap.snapshotItem(i);
        if (node.nodeType === 1) nodes.push(node);
      }}
    }} else if (query.text_contains !== undefined) {{
      const spec = query.text_contains;
      nodes = Array.from(root.querySelectorAll(spec.tag))
        .filter(n => spec.needles.every(s => (n.textContent || "").includes(s)));
    }}
  }} catch (e) {{
    return {{ invalid: String((e && e.message) || e) }};
  }}
  window.__evalfillSeq = window.__evalfillSeq || 0;
  const refs = nodes.map(n => {{
    let r = n.getAttribute(attr);
    if (!r || !r.startsWith(doc + ":")) {{
      r = doc + ":" + (++window.__evalfillSeq);
      n.setAttribute(attr, r);
    }}
    return {{ ref: r, label: n.tagName.toLowerCase() + (n.id ? "#" + n.id : "") }};
  }});
  return {{ refs }};
}})()"##,
        attr = literal(REF_ATTRIBUTE),
        token = DOCUMENT_TOKEN,
        root = root,
        query = json!(query),
    )
}

/// Run `body` with `el` bound to the referenced node
fn on_element(reference: &str, body: &str) -> String {
    format!(
        r#"(() => {{
  const el = {lookup};
  if (!el) return {{ stale: true }};
  const value = ((el) => {{ {body} }})(el);
  return {{ value: value === undefined ? null : value }};
}})()"#,
        lookup = lookup(reference),
        body = body,
    )
}

pub(crate) fn text(reference: &str) -> String {
    on_element(reference, r#"return (el.innerText || el.textContent || "").trim();"#)
}

pub(crate) fn attribute(reference: &str, name: &str) -> String {
    on_element(reference, &format!("return el.getAttribute({});", literal(name)))
}

pub(crate) fn is_visible(reference: &str) -> String {
    on_element(
        reference,
        r#"const style = window.getComputedStyle(el);
  if (style.visibility === "hidden" || style.display === "none") return false;
  return el.getClientRects().length > 0;"#,
    )
}

pub(crate) fn is_enabled(reference: &str) -> String {
    on_element(reference, r#"return !(el.disabled || el.hasAttribute("disabled"));"#)
}

pub(crate) fn click_target(reference: &str) -> String {
    on_element(
        reference,
        r#"el.scrollIntoView({ block: "center", inline: "center" });
  const r = el.getBoundingClientRect();
  const x = r.left + r.width / 2;
  const y = r.top + r.height / 2;
  const top = r.width > 0 && r.height > 0 ? document.elementFromPoint(x, y) : null;
  return { x, y, hit: !!top && (top === el || el.contains(top)), blocker: top ? top.tagName.toLowerCase() : null };"#,
    )
}

pub(crate) fn synthetic_click(reference: &str) -> String {
    on_element(reference, "el.click(); return true;")
}

pub(crate) fn clear(reference: &str) -> String {
    on_element(
        reference,
        r#"if ("value" in el) { el.value = ""; } else { el.textContent = ""; }
  el.dispatchEvent(new Event("input", { bubbles: true }));
  return true;"#,
    )
}

pub(crate) fn set_text(reference: &str, value: &str) -> String {
    on_element(
        reference,
        &format!(
            r#"const text = {};
  el.focus();
  if ("value" in el) {{ el.value = text; }} else {{ el.textContent = text; }}
  el.dispatchEvent(new Event("input", {{ bubbles: true }}));
  el.dispatchEvent(new Event("change", {{ bubbles: true }}));
  return true;"#,
            literal(value)
        ),
    )
}

pub(crate) fn remove_attribute(reference: &str, name: &str) -> String {
    on_element(
        reference,
        &format!(
            r#"const name = {};
  el.removeAttribute(name);
  if (name === "disabled" && "disabled" in el) el.disabled = false;
  return true;"#,
            literal(name)
        ),
    )
}

/// Step back when the tab has history; `false` otherwise
pub(crate) const GO_BACK: &str =
    "(() => { if (window.history.length <= 1) return false; window.history.back(); return true; })()";
