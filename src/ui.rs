//! Interface de terminal do os-workflow: spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`TerminalNotifier`] mostra as notificações do
//! fluxo como "toasts" no terminal e o [`SaveProgress`] acompanha um salvamento.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::notify::{Notification, NotificationLevel, Notifier};
use crate::workflow::{OsType, StepStatus, StepView};

/// Notificações coloridas: sucesso (verde), erro (vermelho), aviso (amarelo), info (ciano).
pub struct TerminalNotifier {
    green: Style,
    red: Style,
    yellow: Style,
    cyan: Style,
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            cyan: Style::new().cyan(),
        }
    }
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let (style, icon) = match notification.level {
            NotificationLevel::Success => (&self.green, "✓"),
            NotificationLevel::Error => (&self.red, "✗"),
            NotificationLevel::Warning => (&self.yellow, "!"),
            NotificationLevel::Info => (&self.cyan, "i"),
        };
        println!("  {} {}", style.apply_to(icon), notification.message);
    }
}

/// Spinner exibido enquanto uma etapa é enviada ao backend.
pub struct SaveProgress {
    // Barra de progresso/spinner do indicatif.
    pb: ProgressBar,
}

impl SaveProgress {
    /// Inicia o spinner com a descrição da etapa.
    pub fn start(title: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(format!("Salvando: {title}"));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

/// Imprime o stepper de um tipo de OS com o status de cada etapa.
pub fn print_stepper(os_type: OsType, steps: &[StepView]) {
    let bold = Style::new().bold();
    let green = Style::new().green();
    let cyan = Style::new().cyan().bold();
    let dim = Style::new().dim();

    println!("{}", bold.apply_to(format!("─── {} ───", os_type.label())));
    for view in steps {
        let step = &view.definition;
        let (marker, style) = match view.status {
            StepStatus::Completed => ("✓", &green),
            StepStatus::Active => ("▶", &cyan),
            StepStatus::Pending => ("·", &dim),
        };
        println!(
            "  {} {:>2}. {} {}",
            style.apply_to(marker),
            step.id,
            style.apply_to(step.title),
            dim.apply_to(format!("({})", step.responsible))
        );
    }
}
