// Copyright 2026 Shelfscan Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page-side JavaScript evaluated by the Chromium context.

/// Serialize the document with open shadow roots and same-origin iframe
/// documents inlined, so CSS selectors over the snapshot see through both
/// boundaries. Frame bodies follow their (emptied) `<iframe>` element since
/// parsers treat iframe content as raw text.
pub const FLATTEN_DOM: &str = r#"
(() => {
  const VOID = new Set(['area','base','br','col','embed','hr','img','input','link','meta','source','track','wbr']);
  const esc = (s) => s.replace(/&/g, '&amp;').replace(/</g, '&lt;').replace(/>/g, '&gt;');
  const attr = (s) => s.replace(/&/g, '&amp;').replace(/"/g, '&quot;');
  const ser = (node) => {
    if (node.nodeType === Node.TEXT_NODE) {
      const p = node.parentNode && node.parentNode.nodeName;
      return (p === 'SCRIPT' || p === 'STYLE') ? node.textContent : esc(node.textContent);
    }
    if (node.nodeType === Node.DOCUMENT_FRAGMENT_NODE) {
      return Array.from(node.childNodes).map(ser).join('');
    }
    if (node.nodeType !== Node.ELEMENT_NODE) return '';
    const tag = node.localName;
    let out = '<' + tag;
    for (const a of Array.from(node.attributes)) out += ' ' + a.name + '="' + attr(a.value) + '"';
    out += '>';
    if (VOID.has(tag)) return out;
    if (node.shadowRoot) out += '<div data-shelfscan-shadow="">' + ser(node.shadowRoot) + '</div>';
    if (tag === 'iframe') {
      out += '</iframe>';
      try {
        const doc = node.contentDocument;
        if (doc && doc.body) out += '<div data-shelfscan-frame="">' + ser(doc.body) + '</div>';
      } catch (e) {}
      return out;
    }
    const kids = tag === 'template' && node.content ? node.content.childNodes : node.childNodes;
    out += Array.from(kids).map(ser).join('');
    return out + '</' + tag + '>';
  };
  return '<!DOCTYPE html>' + ser(document.documentElement);
})()
"#;

/// Click the first visible consent / close control of each known kind.
/// Returns the number of clicks performed.
pub const DISMISS_OVERLAYS: &str = r#"
(() => {
  const labels = ['accept', 'i agree', 'got it'];
  let clicks = 0;
  const buttons = Array.from(document.querySelectorAll('button'));
  for (const label of labels) {
    const btn = buttons.find(b => (b.innerText || '').trim().toLowerCase().startsWith(label));
    if (btn) { try { btn.click(); clicks++; } catch (e) {} }
  }
  const close = document.querySelector('[aria-label="close"], button[aria-label="Close"]');
  if (close) { try { close.click(); clicks++; } catch (e) {} }
  return clicks;
})()
"#;

/// Scroll to the bottom of the page once.
pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body ? document.body.scrollHeight : 0); true";

/// Scroll back to the top.
pub const SCROLL_TO_TOP: &str = "window.scrollTo(0, 0); true";
