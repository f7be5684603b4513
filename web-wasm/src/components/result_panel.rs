//! 読み取り結果

use leptos::prelude::*;

use crate::app::Controller;

#[component]
pub fn ResultPanel(controller: Controller) -> impl IntoView {
    let result = move || controller.state.with(|s| s.result().cloned());

    view! {
        {move || result().map(|result| {
            let rows: Option<Vec<(&'static str, String)>> = result.item.as_ref().map(|item| {
                item.fields()
                    .into_iter()
                    .map(|(label, value)| (label, value.to_string()))
                    .collect()
            });

            view! {
                <section class="result-panel">
                    <h2>{if rows.is_some() { "📦 品目情報" } else { "📄 読み取り結果" }}</h2>

                    {rows.map(|rows| view! {
                        <table class="item-fields">
                            <tbody>
                                {rows.into_iter().map(|(label, value)| view! {
                                    <tr>
                                        <th>{label}</th>
                                        <td>{value}</td>
                                    </tr>
                                }).collect_view()}
                            </tbody>
                        </table>
                    })}

                    <pre class="raw-text">{result.raw.clone()}</pre>
                    <p class="text-muted">{format!("デコード方式: {}", result.strategy)}</p>

                    <div class="result-actions">
                        <button on:click=move |_| controller.copy()>"📋 コピー"</button>
                        {move || controller.notice.get().map(|notice| view! {
                            <span class="notice">{notice}</span>
                        })}
                    </div>
                </section>
            }
        })}
    }
}
