//! 永続化用 DTO とカタログ型の相互変換
//!
//! 列挙値は名前（as_str）で書き、読み込み時に from_str で戻す。
//! 曜日などのビットマスクはネイティブと同じ整数のまま保存する。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tm_domain::error::DomainError;
use tm_domain::model::{
    Action, AppConfig, BootTrigger, ComHandlerAction, Compatibility, ConnectionConfig,
    CustomTrigger, DailyTrigger, DaysOfMonth, DaysOfWeek, Definition, EmailAction, EventTrigger,
    ExecAction, IdleSettings, IdleTrigger, InstancesPolicy, LogonTrigger, LogonType,
    MessageAction, MonthlyDowTrigger, MonthlyTrigger, MonthsOfYear, NetworkSettings, Principal,
    RegistrationInfo, RegistrationTrigger, RepetitionPattern, RunLevel, SessionStateChange,
    SessionStateChangeTrigger, TaskAction, TaskSettings, TaskTrigger, TimeTrigger, Trigger,
    TriggerType, WeeklyTrigger, WeeksOfMonth,
};

fn parse_name<T>(
    kind: &str,
    value: &str,
    from_str: impl Fn(&str) -> Option<T>,
) -> Result<T, DomainError> {
    from_str(value).ok_or_else(|| DomainError::ValidationError(format!("unknown {kind}: {value:?}")))
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_true(value: &bool) -> bool {
    *value
}

// ---------- 設定ファイル ----------

#[derive(Serialize, Deserialize, Default)]
pub(crate) struct ConfigDto {
    #[serde(default)]
    pub connection: ConnectionDto,
    #[serde(default)]
    pub default_folder: String,
    #[serde(default)]
    pub include_hidden: bool,
}

#[derive(Serialize, Deserialize, Default)]
pub(crate) struct ConnectionDto {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl From<&AppConfig> for ConfigDto {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            connection: ConnectionDto {
                server: cfg.connection.server.clone(),
                user: cfg.connection.user.clone(),
                domain: cfg.connection.domain.clone(),
                password: cfg.connection.password.clone(),
            },
            default_folder: cfg.default_folder.clone(),
            include_hidden: cfg.include_hidden,
        }
    }
}

impl TryFrom<ConfigDto> for AppConfig {
    type Error = DomainError;

    fn try_from(dto: ConfigDto) -> Result<Self, Self::Error> {
        let mut cfg = AppConfig {
            connection: ConnectionConfig {
                server: dto.connection.server,
                user: dto.connection.user,
                domain: dto.connection.domain,
                password: dto.connection.password,
            },
            include_hidden: dto.include_hidden,
            ..AppConfig::default()
        };
        if !dto.default_folder.is_empty() {
            cfg.default_folder = dto.default_folder;
        }
        cfg.validate()?;
        cfg.normalize();
        Ok(cfg)
    }
}

// ---------- タスク定義 ----------

#[derive(Serialize, Deserialize, Default)]
pub(crate) struct DefinitionDto {
    #[serde(default)]
    pub registration_info: RegistrationInfoDto,
    #[serde(default)]
    pub principal: PrincipalDto,
    #[serde(default)]
    pub settings: SettingsDto,
    #[serde(default)]
    pub triggers: Vec<TriggerDto>,
    #[serde(default)]
    pub actions: Vec<ActionDto>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    /// 取得時の XML（参考情報。登録には使わない）
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub xml_text: String,
}

impl From<&Definition> for DefinitionDto {
    fn from(def: &Definition) -> Self {
        Self {
            registration_info: RegistrationInfoDto::from(&def.registration_info),
            principal: PrincipalDto::from(&def.principal),
            settings: SettingsDto::from(&def.settings),
            triggers: def.triggers.iter().map(TriggerDto::from).collect(),
            actions: def.actions.iter().map(ActionDto::from).collect(),
            context: def.context.clone(),
            data: def.data.clone(),
            xml_text: def.xml_text.clone(),
        }
    }
}

impl TryFrom<DefinitionDto> for Definition {
    type Error = DomainError;

    fn try_from(dto: DefinitionDto) -> Result<Self, Self::Error> {
        Ok(Definition {
            actions: dto
                .actions
                .into_iter()
                .map(Action::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            context: dto.context,
            data: dto.data,
            principal: Principal::try_from(dto.principal)?,
            registration_info: dto.registration_info.into(),
            settings: TaskSettings::try_from(dto.settings)?,
            triggers: dto
                .triggers
                .into_iter()
                .map(Trigger::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            xml_text: dto.xml_text,
        })
    }
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
pub(crate) struct RegistrationInfoDto {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub documentation: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub security_descriptor: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub uri: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
}

impl From<&RegistrationInfo> for RegistrationInfoDto {
    fn from(info: &RegistrationInfo) -> Self {
        Self {
            author: info.author.clone(),
            date: info.date.clone(),
            description: info.description.clone(),
            documentation: info.documentation.clone(),
            security_descriptor: info.security_descriptor.clone(),
            source: info.source.clone(),
            uri: info.uri.clone(),
            version: info.version.clone(),
        }
    }
}

impl From<RegistrationInfoDto> for RegistrationInfo {
    fn from(dto: RegistrationInfoDto) -> Self {
        Self {
            author: dto.author,
            date: dto.date,
            description: dto.description,
            documentation: dto.documentation,
            security_descriptor: dto.security_descriptor,
            source: dto.source,
            uri: dto.uri,
            version: dto.version,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PrincipalDto {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub group_id: String,
    pub logon_type: String,
    pub run_level: String,
}

impl Default for PrincipalDto {
    fn default() -> Self {
        PrincipalDto::from(&Principal::default())
    }
}

impl From<&Principal> for PrincipalDto {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id.clone(),
            display_name: p.display_name.clone(),
            user_id: p.user_id.clone(),
            group_id: p.group_id.clone(),
            logon_type: p.logon_type.as_str().to_string(),
            run_level: p.run_level.as_str().to_string(),
        }
    }
}

impl TryFrom<PrincipalDto> for Principal {
    type Error = DomainError;

    fn try_from(dto: PrincipalDto) -> Result<Self, Self::Error> {
        Ok(Principal {
            display_name: dto.display_name,
            group_id: dto.group_id,
            id: dto.id,
            logon_type: parse_name(LogonType::KIND, &dto.logon_type, LogonType::from_str)?,
            run_level: parse_name(RunLevel::KIND, &dto.run_level, RunLevel::from_str)?,
            user_id: dto.user_id,
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SettingsDto {
    pub allow_demand_start: bool,
    pub allow_hard_terminate: bool,
    pub compatibility: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub delete_expired_task_after: String,
    pub disallow_start_if_on_batteries: bool,
    pub enabled: bool,
    pub execution_time_limit: String,
    pub hidden: bool,
    pub idle_settings: IdleSettingsDto,
    pub multiple_instances: String,
    #[serde(skip_serializing_if = "NetworkSettingsDto::is_empty")]
    pub network_settings: NetworkSettingsDto,
    pub priority: i32,
    pub restart_count: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub restart_interval: String,
    pub run_only_if_idle: bool,
    pub run_only_if_network_available: bool,
    pub start_when_available: bool,
    pub stop_if_going_on_batteries: bool,
    pub wake_to_run: bool,
}

impl Default for SettingsDto {
    fn default() -> Self {
        SettingsDto::from(&TaskSettings::default())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct IdleSettingsDto {
    pub idle_duration: String,
    pub restart_on_idle: bool,
    pub stop_on_idle_end: bool,
    pub wait_timeout: String,
}

impl Default for IdleSettingsDto {
    fn default() -> Self {
        let idle = IdleSettings::default();
        Self {
            idle_duration: idle.idle_duration,
            restart_on_idle: idle.restart_on_idle,
            stop_on_idle_end: idle.stop_on_idle_end,
            wait_timeout: idle.wait_timeout,
        }
    }
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
pub(crate) struct NetworkSettingsDto {
    pub id: String,
    pub name: String,
}

impl NetworkSettingsDto {
    fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty()
    }
}

impl From<&TaskSettings> for SettingsDto {
    fn from(s: &TaskSettings) -> Self {
        Self {
            allow_demand_start: s.allow_demand_start,
            allow_hard_terminate: s.allow_hard_terminate,
            compatibility: s.compatibility.as_str().to_string(),
            delete_expired_task_after: s.delete_expired_task_after.clone(),
            disallow_start_if_on_batteries: s.disallow_start_if_on_batteries,
            enabled: s.enabled,
            execution_time_limit: s.execution_time_limit.clone(),
            hidden: s.hidden,
            idle_settings: IdleSettingsDto {
                idle_duration: s.idle_settings.idle_duration.clone(),
                restart_on_idle: s.idle_settings.restart_on_idle,
                stop_on_idle_end: s.idle_settings.stop_on_idle_end,
                wait_timeout: s.idle_settings.wait_timeout.clone(),
            },
            multiple_instances: s.multiple_instances.as_str().to_string(),
            network_settings: NetworkSettingsDto {
                id: s.network_settings.id.clone(),
                name: s.network_settings.name.clone(),
            },
            priority: s.priority,
            restart_count: s.restart_count,
            restart_interval: s.restart_interval.clone(),
            run_only_if_idle: s.run_only_if_idle,
            run_only_if_network_available: s.run_only_if_network_available,
            start_when_available: s.start_when_available,
            stop_if_going_on_batteries: s.stop_if_going_on_batteries,
            wake_to_run: s.wake_to_run,
        }
    }
}

impl TryFrom<SettingsDto> for TaskSettings {
    type Error = DomainError;

    fn try_from(dto: SettingsDto) -> Result<Self, Self::Error> {
        if !(0..=10).contains(&dto.priority) {
            return Err(DomainError::ValidationError(format!(
                "priority must be 0..=10: {}",
                dto.priority
            )));
        }
        Ok(TaskSettings {
            allow_demand_start: dto.allow_demand_start,
            allow_hard_terminate: dto.allow_hard_terminate,
            compatibility: parse_name(
                Compatibility::KIND,
                &dto.compatibility,
                Compatibility::from_str,
            )?,
            delete_expired_task_after: dto.delete_expired_task_after,
            disallow_start_if_on_batteries: dto.disallow_start_if_on_batteries,
            enabled: dto.enabled,
            execution_time_limit: dto.execution_time_limit,
            hidden: dto.hidden,
            idle_settings: IdleSettings {
                idle_duration: dto.idle_settings.idle_duration,
                restart_on_idle: dto.idle_settings.restart_on_idle,
                stop_on_idle_end: dto.idle_settings.stop_on_idle_end,
                wait_timeout: dto.idle_settings.wait_timeout,
            },
            multiple_instances: parse_name(
                InstancesPolicy::KIND,
                &dto.multiple_instances,
                InstancesPolicy::from_str,
            )?,
            network_settings: NetworkSettings {
                id: dto.network_settings.id,
                name: dto.network_settings.name,
            },
            priority: dto.priority,
            restart_count: dto.restart_count,
            restart_interval: dto.restart_interval,
            run_only_if_idle: dto.run_only_if_idle,
            run_only_if_network_available: dto.run_only_if_network_available,
            start_when_available: dto.start_when_available,
            stop_if_going_on_batteries: dto.stop_if_going_on_batteries,
            wake_to_run: dto.wake_to_run,
        })
    }
}

// ---------- アクション ----------

/// 全アクション種別のフィールドを平坦に持つ。使わない項目は書き出さない。
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
pub(crate) struct ActionDto {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub args: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub working_dir: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub class_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub server: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub to: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cc: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bcc: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reply_to: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub from: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl From<&Action> for ActionDto {
    fn from(action: &Action) -> Self {
        let mut dto = ActionDto {
            kind: action.action_type().as_str().to_string(),
            id: action.id().to_string(),
            ..ActionDto::default()
        };
        match action {
            Action::Exec(a) => {
                dto.path = a.path.clone();
                dto.args = a.args.clone();
                dto.working_dir = a.working_dir.clone();
            }
            Action::ComHandler(a) => {
                dto.class_id = a.class_id.clone();
                dto.data = a.data.clone();
            }
            Action::SendEmail(a) => {
                dto.server = a.server.clone();
                dto.subject = a.subject.clone();
                dto.to = a.to.clone();
                dto.cc = a.cc.clone();
                dto.bcc = a.bcc.clone();
                dto.reply_to = a.reply_to.clone();
                dto.from = a.from.clone();
                dto.body = a.body.clone();
            }
            Action::ShowMessage(a) => {
                dto.title = a.title.clone();
                dto.message = a.message.clone();
            }
        }
        dto
    }
}

impl TryFrom<ActionDto> for Action {
    type Error = DomainError;

    fn try_from(dto: ActionDto) -> Result<Self, Self::Error> {
        use tm_domain::model::ActionType;

        let base = TaskAction { id: dto.id };
        let action = match parse_name(ActionType::KIND, &dto.kind, ActionType::from_str)? {
            ActionType::Exec => Action::Exec(ExecAction {
                base,
                path: dto.path,
                args: dto.args,
                working_dir: dto.working_dir,
            }),
            ActionType::ComHandler => Action::ComHandler(ComHandlerAction {
                base,
                class_id: dto.class_id,
                data: dto.data,
            }),
            ActionType::SendEmail => Action::SendEmail(EmailAction {
                base,
                server: dto.server,
                subject: dto.subject,
                to: dto.to,
                cc: dto.cc,
                bcc: dto.bcc,
                reply_to: dto.reply_to,
                from: dto.from,
                body: dto.body,
            }),
            ActionType::ShowMessage => Action::ShowMessage(MessageAction {
                base,
                title: dto.title,
                message: dto.message,
            }),
        };
        Ok(action)
    }
}

// ---------- トリガー ----------

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
pub(crate) struct RepetitionDto {
    pub duration: String,
    pub interval: String,
    pub stop_at_duration_end: bool,
}

/// 全トリガー種別のフィールドを平坦に持つ
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TriggerDto {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "is_true")]
    pub enabled: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub start_boundary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub end_boundary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub execution_time_limit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition: Option<RepetitionDto>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub delay: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub random_delay: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subscription: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub value_queries: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_interval: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weeks_interval: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weeks_of_month: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_of_month: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months_of_year: Option<i16>,
    #[serde(skip_serializing_if = "is_false")]
    pub run_on_last_day_of_month: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub run_on_last_week_of_month: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state_change: String,
}

impl Default for TriggerDto {
    fn default() -> Self {
        Self {
            kind: String::new(),
            enabled: true,
            id: String::new(),
            start_boundary: String::new(),
            end_boundary: String::new(),
            execution_time_limit: String::new(),
            repetition: None,
            delay: String::new(),
            random_delay: String::new(),
            subscription: String::new(),
            value_queries: BTreeMap::new(),
            days_interval: None,
            weeks_interval: None,
            days_of_week: None,
            weeks_of_month: None,
            days_of_month: None,
            months_of_year: None,
            run_on_last_day_of_month: false,
            run_on_last_week_of_month: false,
            user_id: String::new(),
            state_change: String::new(),
        }
    }
}

impl From<&Trigger> for TriggerDto {
    fn from(trigger: &Trigger) -> Self {
        let base = trigger.base();
        let mut dto = TriggerDto {
            kind: trigger.trigger_type().as_str().to_string(),
            enabled: base.enabled,
            id: base.id.clone(),
            start_boundary: base.start_boundary.clone(),
            end_boundary: base.end_boundary.clone(),
            execution_time_limit: base.execution_time_limit.clone(),
            repetition: base.repetition.is_set().then(|| RepetitionDto {
                duration: base.repetition.duration.clone(),
                interval: base.repetition.interval.clone(),
                stop_at_duration_end: base.repetition.stop_at_duration_end,
            }),
            ..TriggerDto::default()
        };
        match trigger {
            Trigger::Event(t) => {
                dto.delay = t.delay.clone();
                dto.subscription = t.subscription.clone();
                dto.value_queries = t.value_queries.clone();
            }
            Trigger::Time(t) => dto.random_delay = t.random_delay.clone(),
            Trigger::Daily(t) => {
                dto.days_interval = Some(t.days_interval);
                dto.random_delay = t.random_delay.clone();
            }
            Trigger::Weekly(t) => {
                dto.days_of_week = Some(t.days_of_week.bits());
                dto.weeks_interval = Some(t.weeks_interval);
                dto.random_delay = t.random_delay.clone();
            }
            Trigger::Monthly(t) => {
                dto.days_of_month = Some(t.days_of_month.bits());
                dto.months_of_year = Some(t.months_of_year.bits());
                dto.run_on_last_day_of_month = t.run_on_last_day_of_month;
                dto.random_delay = t.random_delay.clone();
            }
            Trigger::MonthlyDow(t) => {
                dto.days_of_week = Some(t.days_of_week.bits());
                dto.weeks_of_month = Some(t.weeks_of_month.bits());
                dto.months_of_year = Some(t.months_of_year.bits());
                dto.run_on_last_week_of_month = t.run_on_last_week_of_month;
                dto.random_delay = t.random_delay.clone();
            }
            Trigger::Idle(_) | Trigger::Custom(_) => {}
            Trigger::Registration(t) => dto.delay = t.delay.clone(),
            Trigger::Boot(t) => dto.delay = t.delay.clone(),
            Trigger::Logon(t) => {
                dto.delay = t.delay.clone();
                dto.user_id = t.user_id.clone();
            }
            Trigger::SessionStateChange(t) => {
                dto.delay = t.delay.clone();
                dto.state_change = t.state_change.as_str().to_string();
                dto.user_id = t.user_id.clone();
            }
        }
        dto
    }
}

impl TryFrom<TriggerDto> for Trigger {
    type Error = DomainError;

    fn try_from(dto: TriggerDto) -> Result<Self, Self::Error> {
        let kind = parse_name(TriggerType::KIND, &dto.kind, TriggerType::from_str)?;
        let repetition = dto
            .repetition
            .map(|r| RepetitionPattern {
                duration: r.duration,
                interval: r.interval,
                stop_at_duration_end: r.stop_at_duration_end,
            })
            .unwrap_or_default();
        let base = TaskTrigger {
            enabled: dto.enabled,
            end_boundary: dto.end_boundary,
            execution_time_limit: dto.execution_time_limit,
            id: dto.id,
            repetition,
            start_boundary: dto.start_boundary,
        };
        let days_of_week = DaysOfWeek::from_bits(dto.days_of_week.unwrap_or_default());
        let months_of_year = MonthsOfYear::from_bits(dto.months_of_year.unwrap_or_default());

        let trigger = match kind {
            TriggerType::Event => Trigger::Event(EventTrigger {
                base,
                delay: dto.delay,
                subscription: dto.subscription,
                value_queries: dto.value_queries,
            }),
            TriggerType::Time => Trigger::Time(TimeTrigger {
                base,
                random_delay: dto.random_delay,
            }),
            TriggerType::Daily => Trigger::Daily(DailyTrigger {
                base,
                days_interval: dto.days_interval.unwrap_or(1),
                random_delay: dto.random_delay,
            }),
            TriggerType::Weekly => Trigger::Weekly(WeeklyTrigger {
                base,
                days_of_week,
                weeks_interval: dto.weeks_interval.unwrap_or(1),
                random_delay: dto.random_delay,
            }),
            TriggerType::Monthly => Trigger::Monthly(MonthlyTrigger {
                base,
                days_of_month: DaysOfMonth::from_bits(dto.days_of_month.unwrap_or_default()),
                months_of_year,
                run_on_last_day_of_month: dto.run_on_last_day_of_month,
                random_delay: dto.random_delay,
            }),
            TriggerType::MonthlyDow => Trigger::MonthlyDow(MonthlyDowTrigger {
                base,
                days_of_week,
                weeks_of_month: WeeksOfMonth::from_bits(dto.weeks_of_month.unwrap_or_default()),
                months_of_year,
                run_on_last_week_of_month: dto.run_on_last_week_of_month,
                random_delay: dto.random_delay,
            }),
            TriggerType::Idle => Trigger::Idle(IdleTrigger { base }),
            TriggerType::Registration => Trigger::Registration(RegistrationTrigger {
                base,
                delay: dto.delay,
            }),
            TriggerType::Boot => Trigger::Boot(BootTrigger {
                base,
                delay: dto.delay,
            }),
            TriggerType::Logon => Trigger::Logon(LogonTrigger {
                base,
                delay: dto.delay,
                user_id: dto.user_id,
            }),
            TriggerType::SessionStateChange => {
                Trigger::SessionStateChange(SessionStateChangeTrigger {
                    base,
                    delay: dto.delay,
                    // 省略時は既定の状態変化
                    state_change: if dto.state_change.is_empty() {
                        SessionStateChange::default()
                    } else {
                        parse_name(
                            SessionStateChange::KIND,
                            &dto.state_change,
                            SessionStateChange::from_str,
                        )?
                    },
                    user_id: dto.user_id,
                })
            }
            TriggerType::Custom => Trigger::Custom(CustomTrigger { base }),
        };
        Ok(trigger)
    }
}
