//! Screen-space text panels a scene publishes each tick for the renderer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudAnchor {
    TopLeft,
    TopRight,
    TopCenter,
    Center,
    BottomCenter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HudTone {
    #[default]
    Primary,
    Dim,
    Warning,
    Accent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudLine {
    pub text: String,
    pub tone: HudTone,
}

impl HudLine {
    pub fn new(text: impl Into<String>, tone: HudTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudPanel {
    pub anchor: HudAnchor,
    pub lines: Vec<HudLine>,
    /// 0.0 hides the panel entirely, 1.0 draws it fully opaque.
    pub opacity: f32,
}

impl HudPanel {
    pub fn new(anchor: HudAnchor) -> Self {
        Self {
            anchor,
            lines: Vec::new(),
            opacity: 1.0,
        }
    }

    pub fn with_line(mut self, text: impl Into<String>, tone: HudTone) -> Self {
        self.lines.push(HudLine::new(text, tone));
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = clamp_unit(opacity);
        self
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 && !self.lines.is_empty()
    }

    pub fn longest_line_chars(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.text.chars().count())
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudFrame {
    panels: Vec<HudPanel>,
    screen_fade: f32,
}

impl HudFrame {
    pub fn clear(&mut self) {
        self.panels.clear();
        self.screen_fade = 0.0;
    }

    pub fn push_panel(&mut self, panel: HudPanel) {
        if panel.is_visible() {
            self.panels.push(panel);
        }
    }

    pub fn panels(&self) -> &[HudPanel] {
        &self.panels
    }

    pub fn find_panel(&self, anchor: HudAnchor) -> Option<&HudPanel> {
        self.panels.iter().find(|panel| panel.anchor == anchor)
    }

    /// Full-screen black overlay strength applied after world drawing.
    pub fn set_screen_fade(&mut self, fade: f32) {
        self.screen_fade = clamp_unit(fade);
    }

    pub fn screen_fade(&self) -> f32 {
        self.screen_fade
    }
}

fn clamp_unit(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
