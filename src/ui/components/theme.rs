//! Theme scripts for server-rendered pages.
//!
//! - [`theme_script`] runs in `<head>` before first paint so a stored choice
//!   is on the root before the toggle is live. Only the document root can be
//!   marked this early; scoped roots are left to the toggle.
//! - [`toggle_script`] drives every `.dm-toggle` switch on a page that ships
//!   no wasm bundle. It reads each switch's `data-config-*` attributes.

use crate::config::ToggleConfig;
use crate::theme::{
    Strategy, CHANGE_EVENT, CHANNEL_NAME, STORAGE_KEY, THEME_ATTRIBUTE, THEME_CHANGE_EVENT,
};

/// JS string literal, safe inside a `<script>` element
fn js_string(s: &str) -> String {
    serde_json::to_string(s)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
}

pub fn theme_script(config: &ToggleConfig) -> String {
    if config.root.is_some() {
        return String::new();
    }

    let explicit = js_string(config.theme.explicit().map_or("", |m| m.as_str()));
    let key = js_string(STORAGE_KEY);
    let attr = js_string(THEME_ATTRIBUTE);
    let class = js_string(&config.dark_class);
    let use_class = config.strategy == Strategy::Class;

    format!(
        r#"(function(){{
    var root = document.documentElement;
    var t = {explicit};
    if (!t) {{ try {{ t = localStorage.getItem({key}); }} catch (e) {{}} }}
    if (t !== 'light' && t !== 'dark') return;
    if ({use_class}) {{
        root.classList.toggle({class}, t === 'dark');
        root.removeAttribute({attr});
    }} else {{
        root.setAttribute({attr}, t);
        root.classList.remove({class});
    }}
    root.style.colorScheme = t;
}})();"#
    )
}

/// Switch controller for pages without the wasm client (included at the
/// end of `<body>`).
pub fn toggle_script() -> String {
    let key = js_string(STORAGE_KEY);
    let channel = js_string(CHANNEL_NAME);
    let attr = js_string(THEME_ATTRIBUTE);
    let change = js_string(CHANGE_EVENT);
    let themechange = js_string(THEME_CHANGE_EVENT);

    format!(
        r#"(function(){{
    function valid(m) {{ return m === 'light' || m === 'dark'; }}
    function stored() {{
        try {{ var v = localStorage.getItem({key}); return valid(v) ? v : null; }} catch (e) {{ return null; }}
    }}
    function store(m) {{ try {{ localStorage.setItem({key}, m); }} catch (e) {{}} }}
    var media = window.matchMedia ? window.matchMedia('(prefers-color-scheme: dark)') : null;
    var channel = null;
    try {{ channel = new BroadcastChannel({channel}); }} catch (e) {{}}

    function Toggle(btn) {{
        var d = btn.dataset;
        this.btn = btn;
        this.pref = valid(d.configTheme) ? d.configTheme : 'auto';
        this.useClass = d.configStrategy === 'class';
        this.darkClass = d.configDarkClass || 'dark';
        this.persist = d.configPersist !== 'off';
        var root = null;
        if (d.configRoot) {{ try {{ root = document.querySelector(d.configRoot); }} catch (e) {{}} }}
        this.root = root || document.documentElement;
        this.applied = null;
        if (this.persist && !stored() && this.marker() === 'dark') store('dark');
        this.apply(this.resolve(false));
    }}
    Toggle.prototype.marker = function() {{
        if (this.useClass) return this.root.classList.contains(this.darkClass) ? 'dark' : null;
        var v = this.root.getAttribute({attr});
        return valid(v) ? v : null;
    }};
    Toggle.prototype.resolve = function(ignoreOwn) {{
        if (this.pref !== 'auto') return this.pref;
        var s = stored();
        if (s) return s;
        var m = this.marker();
        if (m && !(ignoreOwn && m === this.applied)) return m;
        return media && media.matches ? 'dark' : 'light';
    }};
    Toggle.prototype.hint = function(mode) {{
        this.root.style.colorScheme = mode;
        if (this.root !== document.documentElement) document.documentElement.style.colorScheme = mode;
    }};
    Toggle.prototype.show = function(mode) {{
        this.btn.setAttribute('data-state', mode);
        this.btn.setAttribute('aria-checked', mode === 'dark' ? 'true' : 'false');
    }};
    Toggle.prototype.apply = function(mode) {{
        var r = this.root;
        if (this.useClass) {{
            if (r.classList.contains(this.darkClass) !== (mode === 'dark')) r.classList.toggle(this.darkClass, mode === 'dark');
            if (r.hasAttribute({attr})) r.removeAttribute({attr});
        }} else {{
            if (r.getAttribute({attr}) !== mode) r.setAttribute({attr}, mode);
            if (r.classList.contains(this.darkClass)) r.classList.remove(this.darkClass);
        }}
        this.hint(mode);
        this.show(mode);
        this.applied = mode;
        this.btn.dispatchEvent(new CustomEvent({change}, {{ bubbles: true, detail: {{ mode: mode }} }}));
    }};
    Toggle.prototype.commit = function(mode) {{
        this.pref = mode;
        if (this.persist) store(mode);
        if (channel) {{ try {{ channel.postMessage({{ type: 'themechange', mode: mode }}); }} catch (e) {{}} }}
        window.dispatchEvent(new CustomEvent({themechange}, {{ detail: {{ mode: mode }} }}));
        this.apply(mode);
    }};
    Toggle.prototype.receive = function(mode, persist) {{
        if (!valid(mode)) return;
        this.pref = mode;
        if (persist && this.persist) store(mode);
        this.apply(mode);
    }};
    Toggle.prototype.reflect = function() {{
        if (this.pref !== 'auto') return;
        var mode = this.marker() === 'dark' ? 'dark' : 'light';
        this.hint(mode);
        this.show(mode);
    }};

    var toggles = [];
    document.querySelectorAll('.dm-toggle').forEach(function(btn) {{
        var t = new Toggle(btn);
        toggles.push(t);
        btn.addEventListener('click', function() {{
            if (btn.disabled) return;
            t.commit(btn.getAttribute('data-state') === 'dark' ? 'light' : 'dark');
        }});
        new MutationObserver(function() {{ t.reflect(); }})
            .observe(t.root, {{ attributes: true, attributeFilter: [t.useClass ? 'class' : {attr}] }});
    }});
    if (channel) channel.onmessage = function(e) {{
        var d = e.data;
        if (typeof d === 'string') {{ try {{ d = JSON.parse(d); }} catch (err) {{ return; }} }}
        if (!d || d.type !== 'themechange') return;
        toggles.forEach(function(t) {{ t.receive(d.mode, true); }});
    }};
    window.addEventListener('storage', function(e) {{
        if (e.key !== {key}) return;
        toggles.forEach(function(t) {{
            if (e.newValue === null) {{ t.pref = 'auto'; t.apply(t.resolve(false)); }}
            else t.receive(e.newValue, false);
        }});
    }});
    if (media && media.addEventListener) media.addEventListener('change', function() {{
        toggles.forEach(function(t) {{ if (t.pref === 'auto') t.apply(t.resolve(true)); }});
    }});
}})();"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_script() {
        let script = theme_script(&ToggleConfig::default());
        assert!(script.contains(r#"localStorage.getItem("dm:theme")"#));
        assert!(script.contains("if (false)"));
        assert!(script.contains(r#"root.setAttribute("data-theme", t)"#));
    }

    #[test]
    fn test_explicit_theme_is_inlined() {
        let config = ToggleConfig::from_attributes([("theme", "dark"), ("strategy", "class")]);
        let script = theme_script(&config);
        assert!(script.contains(r#"var t = "dark";"#));
        assert!(script.contains("if (true)"));
    }

    #[test]
    fn test_scoped_root_has_no_script() {
        let config = ToggleConfig::from_attributes([("root", "#app")]);
        assert!(theme_script(&config).is_empty());
    }

    #[test]
    fn test_toggle_script_wires_page_contract() {
        let script = toggle_script();
        assert!(script.contains(r#"new BroadcastChannel("dm:theme")"#));
        assert!(script.contains(r#"localStorage.setItem("dm:theme", m)"#));
        assert!(script.contains("type: 'themechange'"));
        assert!(script.contains(r#"new CustomEvent("themechange""#));
        assert!(script.contains(r#"new CustomEvent("change""#));
        assert!(script.contains("querySelectorAll('.dm-toggle')"));
        // Receivers apply without posting back
        let receive = script
            .split("Toggle.prototype.receive")
            .nth(1)
            .and_then(|rest| rest.split("Toggle.prototype.reflect").next())
            .unwrap();
        assert!(!receive.contains("postMessage"));
    }

    #[test]
    fn test_class_name_cannot_close_script() {
        let config = ToggleConfig::from_attributes([("dark-class", "</script><b>")]);
        let script = theme_script(&config);
        assert!(!script.contains("</script>"));
    }
}
