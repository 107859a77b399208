//! Container for a rendered SVG chart, with loading and empty states.

use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct ChartContainerProps {
    /// DOM id of the container
    pub id: String,
    /// SVG markup; `None` shows the empty message
    pub svg: Option<String>,
    #[props(default = false)]
    pub loading: bool,
    #[props(default = 240)]
    pub min_height: u32,
    #[props(default = "No chart data".to_string())]
    pub empty_message: String,
}

#[component]
pub fn ChartContainer(props: ChartContainerProps) -> Element {
    let style = format!(
        "min-height: {}px; position: relative; width: 100%;",
        props.min_height
    );

    rsx! {
        div {
            style: "{style}",
            if props.loading {
                div {
                    style: "position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); color: #666;",
                    "Loading chart..."
                }
            } else if let Some(svg) = props.svg.clone() {
                div {
                    id: "{props.id}",
                    style: "width: 100%;",
                    dangerous_inner_html: "{svg}",
                }
            } else {
                div {
                    style: "padding: 12px; color: #666;",
                    "{props.empty_message}"
                }
            }
        }
    }
}
