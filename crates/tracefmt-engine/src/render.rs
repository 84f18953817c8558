use crate::{ThreadStream, TimeFormatter};
use tracefmt_catalog::{MessageCatalog, raw_hex};
use tracefmt_types::{ThreadFilter, ThreadId, TracePoint, TracePointKind};

const TP_ID_WIDTH: usize = 14;
const TYPE_WIDTH: usize = 10;

/// Per-run rendering switches.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Indent entry/exit nesting.
    pub indent: bool,
    /// Append the source file and offset of each record.
    pub debug: bool,
    /// Correlation tag inserted after the time column.
    pub user_tag: Option<String>,
    pub pointer_width: u8,
    pub filter: ThreadFilter,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: false,
            debug: false,
            user_tag: None,
            pointer_width: 8,
            filter: ThreadFilter::all(),
        }
    }
}

/// Turns merged tracepoints into output lines.
#[derive(Debug, Clone)]
pub struct Renderer {
    options: RenderOptions,
    time: TimeFormatter,
    last_thread: Option<ThreadId>,
}

impl Renderer {
    pub fn new(options: RenderOptions, time: TimeFormatter) -> Self {
        Self {
            options,
            time,
            last_thread: None,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render one tracepoint. Returns `None` when the thread filter drops it.
    ///
    /// Updates the thread-change state and, in indent mode, the owning
    /// stream's depth.
    pub fn render(
        &mut self,
        tp: &TracePoint,
        stream: &mut ThreadStream,
        catalog: &MessageCatalog,
    ) -> Option<String> {
        let TracePointKind::Tracepoint {
            tp_type,
            component,
            tp_id,
            params,
        } = &tp.kind
        else {
            return Some(self.render_control(tp));
        };

        if !self.options.filter.matches(tp.thread_id) {
            return None;
        }

        let changed = self.last_thread != Some(tp.thread_id);
        self.last_thread = Some(tp.thread_id);

        let mut line = self.prefix(tp);
        line.push(if changed { '*' } else { ' ' });
        line.push_str(&tp.thread_id.to_hex(self.options.pointer_width));
        line.push(' ');
        line.push_str(&format!(
            "{:<width$}",
            format!("{}.{}", component, tp_id),
            width = TP_ID_WIDTH
        ));
        line.push(' ');

        match catalog.lookup(component, *tp_id) {
            None => {
                log::debug!("No message for tracepoint [{}.{}]", component, tp_id);
                line.push_str(&format!("{:<width$}", tp_type.label(), width = TYPE_WIDTH));
                line.push(' ');
                line.push_str(&format!(
                    "*** unformatted tracepoint, raw parameters: [{}]",
                    raw_hex(params)
                ));
            }
            Some(template) => {
                let tp_type = template.tp_type;
                line.push_str(&format!("{:<width$}", tp_type.label(), width = TYPE_WIDTH));
                line.push(' ');
                if self.options.indent {
                    if tp_type.is_entry() {
                        stream.indent();
                    }
                    line.push_str(&" ".repeat(stream.indent_depth()));
                    if tp_type.is_exit() {
                        stream.outdent();
                    }
                }
                line.push_str(&template.render(params, self.options.pointer_width));
            }
        }

        if self.options.debug {
            line.push(' ');
            line.push_str(&tp.source.to_string());
        }
        Some(line)
    }

    /// Self-describing line for a control record.
    pub fn render_control(&self, tp: &TracePoint) -> String {
        let thread = tp.thread_id.to_hex(self.options.pointer_width);
        let text = match &tp.kind {
            TracePointKind::LostRecords { count } => {
                format!("{} trace records were lost by thread {}", count, thread)
            }
            TracePointKind::BufferWrap => format!("trace buffer wrapped on thread {}", thread),
            TracePointKind::Tracepoint { .. } => format!("tracepoint on thread {}", thread),
        };
        format!("{}*** {}", self.prefix(tp), text)
    }

    /// Time column and optional user tag, each followed by a space.
    fn prefix(&self, tp: &TracePoint) -> String {
        let mut out = self.time.format(tp.platform);
        out.push(' ');
        if let Some(tag) = &self.options.user_tag {
            out.push_str(tag);
            out.push(' ');
        }
        out
    }

    /// Column header aligned with rendered lines.
    pub fn headings(&self) -> String {
        let blanks = self
            .options
            .user_tag
            .as_ref()
            .map_or(String::new(), |tag| " ".repeat(tag.len() + 1));
        let thread_width = 1 + 2 + 2 * self.options.pointer_width as usize;
        format!(
            "{:<tw$} {}{:<thw$} {:<idw$} {:<tyw$} TraceEntry",
            self.time.heading(),
            blanks,
            " ThreadID",
            "TP id",
            "Type",
            tw = self.time.width(),
            thw = thread_width,
            idw = TP_ID_WIDTH,
            tyw = TYPE_WIDTH,
        )
    }
}
