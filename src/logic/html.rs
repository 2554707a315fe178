// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! HTML projection of rendered repeater rows and the surrounding control chrome.
//! User text is escaped with `ammonia::clean_text` on the way out; the add
//! button caption arrives already escaped from the control.

use ammonia::clean_text;

use crate::logic::control::RepeaterControl;
use crate::logic::template::{Control, ImagePreview, RenderedField, RenderedRow};

/// Render one row as a `<li>` element.
pub fn render_row_html(row: &RenderedRow) -> String {
    let mut out = String::new();
    let class = if row.minimized {
        "repeater-row minimized"
    } else {
        "repeater-row"
    };
    out.push_str(&format!("<li class=\"{class}\" data-row=\"{}\">\n", row.index));
    out.push_str("<div class=\"repeater-row-header\">");
    out.push_str(&format!(
        "<span class=\"repeater-row-label\">{}</span>",
        clean_text(&row.label)
    ));
    out.push_str("<i class=\"dashicons dashicons-arrow-down repeater-minimize\"></i></div>\n");
    out.push_str("<div class=\"repeater-row-content\">\n");
    for field in &row.fields {
        render_field(&mut out, field);
    }
    out.push_str(&format!(
        "<button type=\"button\" class=\"button-link repeater-row-remove\">{}</button>\n",
        clean_text(&row.remove_label)
    ));
    out.push_str("</div>\n</li>\n");
    out
}

/// Render the whole control: title, description, rows, limit note and add button.
pub fn render_control_html(control: &RepeaterControl) -> String {
    let mut out = String::new();

    if !control.tooltip().is_empty() {
        out.push_str(&format!(
            "<a href=\"#\" class=\"tooltip hint--left\" data-hint=\"{}\"><span class=\"dashicons dashicons-info\"></span></a>\n",
            clean_text(control.tooltip())
        ));
    }
    out.push_str("<label>\n");
    if !control.label().is_empty() {
        out.push_str(&format!(
            "<span class=\"customize-control-title\">{}</span>\n",
            clean_text(control.label())
        ));
    }
    if !control.description().is_empty() {
        out.push_str(&format!(
            "<span class=\"description customize-control-description\">{}</span>\n",
            clean_text(control.description())
        ));
    }
    out.push_str(&format!(
        "<input type=\"hidden\" value=\"\" data-customize-setting-link=\"{}\" />\n</label>\n",
        clean_text(control.id())
    ));

    out.push_str("<ul class=\"repeater-fields\">\n");
    for row in control.render_rows() {
        out.push_str(&render_row_html(&row));
    }
    out.push_str("</ul>\n");

    if let Some(text) = control.limit_text() {
        out.push_str(&format!("<p class=\"limit\">{}</p>\n", clean_text(&text)));
    }
    out.push_str(&format!(
        "<button class=\"button-secondary repeater-add\">{}</button>\n",
        control.button_label()
    ));
    out
}

fn render_title(out: &mut String, field: &RenderedField) {
    if let Some(label) = &field.label {
        out.push_str(&format!(
            "<span class=\"customize-control-title\">{}</span>\n",
            clean_text(label)
        ));
    }
    if let Some(desc) = &field.description {
        out.push_str(&format!(
            "<span class=\"description customize-control-description\">{}</span>\n",
            clean_text(desc)
        ));
    }
}

fn checked_attr(on: bool, attr: &str) -> String {
    if on {
        format!(" {attr}=\"{attr}\"")
    } else {
        String::new()
    }
}

fn render_field(out: &mut String, field: &RenderedField) {
    let id = clean_text(&field.id);
    out.push_str(&format!(
        "<div class=\"repeater-field repeater-field-{}\">\n",
        clean_text(field.kind.as_str())
    ));

    match &field.control {
        Control::Input { input_type, value } => {
            out.push_str("<label>\n");
            render_title(out, field);
            out.push_str(&format!(
                "<input type=\"{}\" name=\"\" value=\"{}\" data-field=\"{id}\">\n</label>\n",
                clean_text(input_type),
                clean_text(value)
            ));
        }
        Control::Hidden { value } => {
            let value_attr = value
                .as_deref()
                .map(|v| format!(" value=\"{}\"", clean_text(v)))
                .unwrap_or_default();
            out.push_str(&format!(
                "<input type=\"hidden\" data-field=\"{id}\"{value_attr} />\n"
            ));
        }
        Control::Checkbox { checked, caption } => {
            out.push_str(&format!(
                "<label>\n<input type=\"checkbox\" value=\"true\" data-field=\"{id}\"{} />\n",
                checked_attr(*checked, "checked")
            ));
            if let Some(caption) = caption {
                out.push_str(&clean_text(caption));
                out.push('\n');
            }
            out.push_str("</label>\n");
        }
        Control::Select { options } => {
            out.push_str("<label>\n");
            render_title(out, field);
            out.push_str(&format!("<select data-field=\"{id}\">\n"));
            for opt in options {
                out.push_str(&format!(
                    "<option value=\"{}\"{}>{}</option>\n",
                    clean_text(&opt.value),
                    checked_attr(opt.selected, "selected"),
                    clean_text(&opt.text)
                ));
            }
            out.push_str("</select>\n</label>\n");
        }
        Control::Radio { name, options } => {
            out.push_str("<label>\n");
            render_title(out, field);
            for opt in options {
                out.push_str(&format!(
                    "<label><input type=\"radio\" name=\"{}\" data-field=\"{id}\" value=\"{}\"{}> {} <br/></label>\n",
                    clean_text(name),
                    clean_text(&opt.value),
                    checked_attr(opt.selected, "checked"),
                    clean_text(&opt.text)
                ));
            }
            out.push_str("</label>\n");
        }
        Control::RadioImage { name, options } => {
            out.push_str("<label>\n");
            render_title(out, field);
            for opt in options {
                let dom_id = clean_text(&opt.dom_id);
                out.push_str(&format!(
                    "<input type=\"radio\" id=\"{dom_id}\" name=\"{}\" data-field=\"{id}\" value=\"{}\"{}>\n<label for=\"{dom_id}\"><img src=\"{}\"></label>\n",
                    clean_text(name),
                    clean_text(&opt.value),
                    checked_attr(opt.checked, "checked"),
                    clean_text(&opt.src)
                ));
            }
            out.push_str("</label>\n");
        }
        Control::Textarea { value, rows } => {
            render_title(out, field);
            out.push_str(&format!(
                "<textarea rows=\"{rows}\" data-field=\"{id}\">{}</textarea>\n",
                clean_text(value)
            ));
        }
        Control::Image(image) => {
            out.push_str("<label>\n");
            render_title(out, field);
            out.push_str("</label>\n");
            out.push_str(&format!(
                "<figure class=\"kirki-image-attachment\" data-placeholder=\"{}\">\n",
                clean_text(&image.placeholder)
            ));
            match &image.preview {
                ImagePreview::Image { src } => {
                    out.push_str(&format!("<img src=\"{}\">\n", clean_text(src)));
                }
                ImagePreview::Placeholder(text) => {
                    out.push_str(&clean_text(text));
                    out.push('\n');
                }
            }
            out.push_str("</figure>\n<div class=\"actions\">\n");
            let hidden = if image.has_value { "" } else { " hidden" };
            out.push_str(&format!(
                "<button type=\"button\" class=\"button remove-button{hidden}\">{}</button>\n",
                clean_text(&image.remove_label)
            ));
            out.push_str(&format!(
                "<button type=\"button\" class=\"button upload-button\" data-label=\"{}\" data-alt-label=\"{}\">{}</button>\n",
                clean_text(&image.select_label),
                clean_text(&image.change_label),
                clean_text(&image.upload_label)
            ));
            out.push_str(&format!(
                "<input type=\"hidden\" class=\"hidden-field\" value=\"{}\" data-field=\"{id}\">\n</div>\n",
                clean_text(&image.hidden_value)
            ));
        }
    }

    out.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlConfig;
    use crate::l10n::Strings;
    use crate::logic::reconcile::MediaLibrary;
    use serde_json::json;

    fn control(value: serde_json::Value) -> RepeaterControl {
        let config: ControlConfig = serde_json::from_value(json!({
            "id": "slides",
            "label": "Slides",
            "fields": {
                "title": { "type": "text", "label": "Title" },
                "size": { "type": "select", "choices": { "1": "Small", "2": "Large" } },
                "photo": { "type": "image" },
                "tint": { "type": "color" }
            },
            "limit": 4
        }))
        .unwrap();
        let mut media = MediaLibrary::default();
        media.insert(9, "https://m/9.png");
        RepeaterControl::new(&config, &value, &media, &Strings::english())
    }

    #[test]
    fn row_html_marks_selection_and_image_state() {
        let ctl = control(json!([{ "title": "A", "size": 2, "photo": "9" }]));
        let html = render_row_html(&ctl.render_row(0).unwrap());

        assert!(html.contains("class=\"repeater-row minimized\""));
        assert!(html.contains("data-row=\"0\""));
        assert!(html.contains("selected=\"selected\">Large</option>"));
        assert!(!html.contains("selected=\"selected\">Small</option>"));
        assert!(html.contains("<img src="));
        assert!(html.contains("class=\"button remove-button\""));
        assert!(html.contains("value=\"9\" data-field=\"photo\""));
        assert!(!html.contains("repeater-field-color"));
    }

    #[test]
    fn user_text_is_escaped() {
        let ctl = control(json!([{ "title": "<script>alert(1)</script>" }]));
        let html = render_row_html(&ctl.render_row(0).unwrap());
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn control_html_includes_limit_and_add_button() {
        let ctl = control(json!([]));
        let html = render_control_html(&ctl);
        assert!(html.contains("<ul class=\"repeater-fields\">\n</ul>"));
        assert!(html.contains("class=\"limit\""));
        assert!(html.contains("repeater-add"));
        assert!(html.contains("customize-control-title"));
    }

    #[test]
    fn empty_image_shows_placeholder_and_hides_remove() {
        let ctl = control(json!([{ "title": "A" }]));
        let html = render_row_html(&ctl.render_row(0).unwrap());
        assert!(html.contains("remove-button hidden"));
    }
}
