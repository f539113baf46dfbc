//! Implementação dos subcomandos da CLI.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::config::WorkflowConfig;
use crate::etapas::{EtapasClient, MemoryEtapaStore};
use crate::notify::Notifier;
use crate::ui::{SaveProgress, TerminalNotifier, print_stepper};
use crate::workflow::{
    AgendamentoData, AnexoData, AnexoTemplate, ArquivoAnexo, AssinaturaData, DocumentoData,
    FollowUpData, ItemEscopo, LeadData, MemorialData, NavigationOutcome, OsType,
    PrecificacaoData, StepData, StepDefinition, StepForm, StepId, StepStatus, StepView,
    TipoOsData, Workflow,
};

/// `steps`: imprime o registro de etapas do tipo de OS.
pub fn steps(os_type: OsType) {
    let views: Vec<StepView> = os_type
        .registry()
        .steps()
        .iter()
        .map(|definition| StepView {
            definition: definition.clone(),
            status: StepStatus::Pending,
        })
        .collect();
    print_stepper(os_type, &views);
}

fn remote_workflow(
    config: &WorkflowConfig,
    os_type: OsType,
) -> Result<Workflow<EtapasClient>> {
    let client = EtapasClient::new(&config.api_url, config.session(), config.request_timeout())
        .context("failed to build HTTP client")?;
    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier::new());
    Ok(Workflow::new(os_type, client, notifier)?)
}

/// `status`: busca as etapas da OS e mostra o stepper.
pub async fn status(config: &WorkflowConfig, os_id: Uuid, os_type: OsType) -> Result<()> {
    let mut workflow = remote_workflow(config, os_type)?;
    if !workflow.bind_order(Some(os_id)).await {
        bail!("could not load etapas of work order {os_id}");
    }
    workflow.resume();
    print_stepper(os_type, &workflow.stepper());
    Ok(())
}

/// `save`: decodifica o arquivo como o formulário da etapa e salva.
pub async fn save(
    config: &WorkflowConfig,
    os_id: Uuid,
    os_type: OsType,
    step: StepId,
    data_path: &Path,
    is_draft: bool,
) -> Result<()> {
    let mut workflow = remote_workflow(config, os_type)?;
    let definition = workflow
        .registry()
        .get(step)
        .cloned()
        .with_context(|| format!("{os_type} has no step {step}"))?;

    let contents = std::fs::read_to_string(data_path)
        .with_context(|| format!("failed to read {}", data_path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;
    let data = StepData::decode(definition.form, value)
        .with_context(|| format!("{} is not valid {} data", data_path.display(), definition.form))?;

    if !workflow.bind_order(Some(os_id)).await {
        bail!("could not load etapas of work order {os_id}");
    }

    let progress = SaveProgress::start(definition.title);
    let saved = workflow
        .store_mut()
        .save_step(step, is_draft, Some(data))
        .await;
    progress.finish();

    if !saved {
        bail!("step {step} was not saved");
    }
    Ok(())
}

/// `demo`: percorre um fluxo em memória com dados de exemplo.
pub async fn demo(os_type: OsType) -> Result<()> {
    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier::new());
    let (workflow, _) = demo_workflow(os_type, notifier).await?;
    print_stepper(os_type, &workflow.stepper());
    Ok(())
}

/// Executa o roteiro da demonstração e devolve o fluxo e o id da OS.
pub async fn demo_workflow(
    os_type: OsType,
    notifier: Arc<dyn Notifier>,
) -> Result<(Workflow<MemoryEtapaStore>, Uuid)> {
    let remote = MemoryEtapaStore::new();
    let os_id = Uuid::new_v4();
    remote.provision(os_id, &os_type.registry()).await?;

    let mut workflow = Workflow::new(os_type, remote, notifier.clone())?;
    if !workflow.bind_order(Some(os_id)).await {
        bail!("could not load etapas of work order {os_id}");
    }

    // Preenche e conclui as três primeiras etapas.
    for _ in 0..3 {
        let definition = workflow
            .registry()
            .get(workflow.current_step())
            .cloned()
            .context("current step outside of the registry")?;
        workflow.update_current_data(sample_data(&definition))?;
        if !matches!(workflow.next_step().await, NavigationOutcome::Moved { .. }) {
            bail!("demo could not advance past step {}", definition.id);
        }
    }

    // Uma etapa à frente ainda está bloqueada.
    let ahead = workflow.current_step() + 1;
    workflow.click_step(ahead);

    // Revisita a etapa 1 e volta para a posição real.
    workflow.click_step(1);
    workflow.update_current_data(StepData::default_for(StepForm::Lead))?;
    workflow.return_to_active();

    workflow.save_draft().await;

    Ok((workflow, os_id))
}

/// Dados de exemplo preenchidos para o formulário da etapa.
fn sample_data(step: &StepDefinition) -> StepData {
    let hoje = Utc::now().date_naive();
    match step.form {
        StepForm::Lead => StepData::Lead(LeadData {
            lead_id: Some("LEAD-0001".into()),
            nome: "Condomínio Residencial Aurora".into(),
            email: "sindico@aurora.example".into(),
            telefone: "(61) 99999-0000".into(),
            endereco: "SQN 210, Bloco B, Brasília - DF".into(),
        }),
        StepForm::TipoOs => StepData::TipoOs(TipoOsData {
            tipo_os: Some("OS-01".into()),
            descricao: "Recuperação de fachada".into(),
        }),
        StepForm::FollowUp => StepData::FollowUp(FollowUpData {
            anotacoes: "Cliente relatou infiltração no bloco B".into(),
            proximo_contato: hoje.succ_opt(),
            interessado: Some(true),
        }),
        StepForm::Memorial => StepData::Memorial(MemorialData {
            objetivo: "Recuperar revestimento da fachada".into(),
            itens: vec![ItemEscopo {
                descricao: "Remoção de reboco solto".into(),
                quantidade: 120,
            }],
            prazo_dias: Some(45),
        }),
        StepForm::Precificacao => StepData::Precificacao(PrecificacaoData {
            custo_materiais: 18_000.0,
            custo_mao_de_obra: 22_000.0,
            percentual_lucro: 20.0,
            percentual_imposto: 11.33,
            desconto: 0.0,
        }),
        StepForm::Agendamento => StepData::Agendamento(AgendamentoData {
            data: NaiveDate::from_ymd_opt(2026, 11, 3),
            horario: NaiveTime::from_hms_opt(9, 0, 0),
            local: "Portaria do bloco B".into(),
            responsavel: "Eng. Carla Mendes".into(),
        }),
        StepForm::Documento => StepData::Documento(DocumentoData {
            documento_url: Some(format!("https://documentos.example/os/{}.pdf", step.id)),
            gerado_em: Some(Utc::now()),
            enviado_ao_cliente: false,
        }),
        StepForm::Anexo => StepData::Anexo(AnexoData {
            arquivo: Some(ArquivoAnexo {
                nome: sample_file_name(step.anexo),
                url: "https://arquivos.example/upload".into(),
                tamanho_bytes: 48_213,
            }),
            observacoes: String::new(),
        }),
        StepForm::Assinatura => StepData::Assinatura(AssinaturaData {
            contrato_assinado: true,
            data_assinatura: Some(hoje),
            signatario: "Síndico".into(),
        }),
    }
}

fn sample_file_name(template: Option<AnexoTemplate>) -> String {
    let ext = template
        .and_then(|t| t.extensions.first().copied())
        .unwrap_or("pdf");
    format!("anexo.{ext}")
}
