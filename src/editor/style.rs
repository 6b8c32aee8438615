//! Visual classification of line types.

use line_store::LineType;

/// Column width of the page every style is laid out on.
pub const PAGE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// How a line of a given type is laid out on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    pub class: &'static str,
    /// Left margin in columns.
    pub indent: usize,
    /// Text column width, measured on a [`PAGE_WIDTH`] page.
    pub width: usize,
    pub uppercase: bool,
    pub align: Align,
}

const SCENE_HEADING: LineStyle = LineStyle {
    class: "editable-line scene-heading",
    indent: 0,
    width: PAGE_WIDTH,
    uppercase: true,
    align: Align::Left,
};

const ACTION: LineStyle = LineStyle {
    class: "editable-line action",
    indent: 0,
    width: PAGE_WIDTH,
    uppercase: false,
    align: Align::Left,
};

const CHARACTER: LineStyle = LineStyle {
    class: "editable-line character",
    indent: 22,
    width: 38,
    uppercase: true,
    align: Align::Left,
};

const DIALOGUE: LineStyle = LineStyle {
    class: "editable-line dialogue",
    indent: 10,
    width: 35,
    uppercase: false,
    align: Align::Left,
};

const PARENTHETICAL: LineStyle = LineStyle {
    class: "editable-line parenthetical",
    indent: 16,
    width: 25,
    uppercase: false,
    align: Align::Left,
};

const TRANSITION: LineStyle = LineStyle {
    class: "editable-line transition",
    indent: 0,
    width: PAGE_WIDTH,
    uppercase: true,
    align: Align::Right,
};

pub fn classify(line_type: LineType) -> LineStyle {
    match line_type {
        LineType::SceneHeading => SCENE_HEADING,
        LineType::Action => ACTION,
        LineType::Character => CHARACTER,
        LineType::Dialogue => DIALOGUE,
        LineType::Parenthetical => PARENTHETICAL,
        LineType::Transition => TRANSITION,
    }
}

/// Classifies a wire type name; unknown names get the action style.
pub fn classify_name(name: &str) -> LineStyle {
    LineType::from_name(name)
        .map(classify)
        .unwrap_or(ACTION)
}

impl LineStyle {
    /// Indent and column width scaled to a page `page_width` columns wide.
    pub fn fit(&self, page_width: usize) -> (usize, usize) {
        if page_width >= PAGE_WIDTH {
            return (self.indent, self.width);
        }
        let indent = self.indent * page_width / PAGE_WIDTH;
        let width = (self.width * page_width / PAGE_WIDTH).max(1);
        (indent, width)
    }

    /// Uppercases without changing the char count, so caret offsets stay valid.
    pub fn transform(&self, text: &str) -> String {
        if !self.uppercase {
            return text.to_string();
        }
        text.chars()
            .map(|ch| {
                let mut upper = ch.to_uppercase();
                match (upper.next(), upper.next()) {
                    (Some(single), None) => single,
                    _ => ch,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, classify_name, Align, PAGE_WIDTH};
    use line_store::LineType;

    #[test]
    fn every_type_has_its_class() {
        let classes: Vec<&str> = LineType::ALL
            .iter()
            .map(|line_type| classify(*line_type).class)
            .collect();
        assert_eq!(
            classes,
            vec![
                "editable-line scene-heading",
                "editable-line action",
                "editable-line character",
                "editable-line dialogue",
                "editable-line parenthetical",
                "editable-line transition",
            ]
        );
    }

    #[test]
    fn unknown_names_fall_back_to_action() {
        assert_eq!(classify_name("montage"), classify(LineType::Action));
        assert_eq!(classify_name("dialogue"), classify(LineType::Dialogue));
    }

    #[test]
    fn transitions_align_right() {
        assert_eq!(classify(LineType::Transition).align, Align::Right);
    }

    #[test]
    fn fit_scales_down_narrow_pages() {
        let character = classify(LineType::Character);
        assert_eq!(character.fit(PAGE_WIDTH + 20), (22, 38));
        assert_eq!(character.fit(30), (11, 19));
    }

    #[test]
    fn uppercase_keeps_char_count() {
        let heading = classify(LineType::SceneHeading);
        assert_eq!(heading.transform("int. straße"), "INT. STRAßE");
        assert_eq!(classify(LineType::Action).transform("int."), "int.");
    }
}
