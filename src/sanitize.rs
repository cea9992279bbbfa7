//! Page-side cleanup executed before capture.

/// Deterministic cleanup script run in the page right before the screenshot.
///
/// Hides consent banners and viewport-covering overlays, restores scroll
/// locks they leave behind, and freezes autoplay media, so captures show the
/// page content rather than transient UI chrome. Every step is wrapped so a
/// hostile or broken page cannot fail the evaluation.
pub const SANITIZE_SCRIPT: &str = r#"
(() => {
    const cleaned = { banners: 0, overlays: 0, media: 0 };
    const hide = (el) => {
        try {
            el.style.setProperty('display', 'none', 'important');
            el.style.setProperty('visibility', 'hidden', 'important');
            return true;
        } catch (_) { return false; }
    };

    // Consent banners, cookie walls, and sign-up dialogs by common naming.
    try {
        const selectors = [
            '[id*="cookie" i]', '[class*="cookie" i]',
            '[id*="consent" i]', '[class*="consent" i]',
            '[id*="gdpr" i]', '[class*="gdpr" i]',
            '[class*="newsletter" i]', '[class*="paywall" i]',
            '[class*="modal-backdrop" i]',
            '[aria-modal="true"]', '[role="dialog"]'
        ];
        document.querySelectorAll(selectors.join(',')).forEach((el) => {
            if (hide(el)) cleaned.banners++;
        });
    } catch (_) {}

    // High z-index fixed/sticky layers covering most of the viewport.
    try {
        const vw = Math.max(1, window.innerWidth || 1);
        const vh = Math.max(1, window.innerHeight || 1);
        for (const el of document.querySelectorAll('body *')) {
            const style = window.getComputedStyle(el);
            if (!style) continue;
            const pos = (style.position || '').toLowerCase();
            if (pos !== 'fixed' && pos !== 'sticky' && pos !== 'absolute') continue;
            const z = Number.parseInt(style.zIndex || '', 10);
            if (!Number.isFinite(z) || z < 100) continue;
            const rect = el.getBoundingClientRect();
            if (!rect || rect.width * rect.height < vw * vh * 0.5) continue;
            if (hide(el)) cleaned.overlays++;
        }
    } catch (_) {}

    // Dismissed dialogs often leave the document scroll-locked.
    try {
        document.documentElement.style.setProperty('overflow', 'visible', 'important');
        document.body.style.setProperty('overflow', 'visible', 'important');
    } catch (_) {}

    // Freeze media so full-page capture is not racing a video frame.
    try {
        document.querySelectorAll('video, audio').forEach((m) => {
            try {
                m.pause();
                m.muted = true;
                m.removeAttribute('autoplay');
                cleaned.media++;
            } catch (_) {}
        });
    } catch (_) {}

    return cleaned;
})()
"#;
