//! カタログ型 → ネイティブ定義の組み立てと登録

use crate::com::{bstr, cast, com_error, variant_bool, variant_str};
use crate::read::read_registered_task;
use tm_domain::model::{
    Action, Definition, IdleSettings, NetworkSettings, Principal, RegisteredTask,
    RegistrationInfo, RepetitionPattern, TaskSettings, TaskTrigger, Trigger,
};
use tm_domain::port::driven::RegisterRequest;
use tm_domain::DomainError;
use tracing::debug;
use windows::core::VARIANT;
use windows::Win32::System::TaskScheduler::{
    IActionCollection, IBootTrigger, IComHandlerAction, IDailyTrigger, IEmailAction,
    IEventTrigger, IExecAction, ILogonTrigger, IMonthlyDOWTrigger, IMonthlyTrigger, IPrincipal,
    IRegistrationInfo, IRegistrationTrigger, ISessionStateChangeTrigger, IShowMessageAction,
    ITaskDefinition, ITaskFolder, ITaskService, ITaskSettings, ITimeTrigger, ITrigger,
    ITriggerCollection, IWeeklyTrigger, TASK_ACTION_TYPE, TASK_COMPATIBILITY,
    TASK_INSTANCES_POLICY, TASK_LOGON_TYPE, TASK_RUNLEVEL_TYPE, TASK_SESSION_STATE_CHANGE_TYPE,
    TASK_TRIGGER_TYPE2,
};

/// 空文字の項目はネイティブ既定のまま残す
macro_rules! set_str {
    ($obj:expr, $setter:ident, $value:expr) => {
        if !$value.is_empty() {
            $obj.$setter(&bstr(&$value))
                .map_err(|e| com_error(stringify!($setter), e))?;
        }
    };
}

macro_rules! set_bool {
    ($obj:expr, $setter:ident, $value:expr) => {
        $obj.$setter(variant_bool($value))
            .map_err(|e| com_error(stringify!($setter), e))?;
    };
}

/// NewTask(0) で新しい定義を作り、カタログの内容を書き込む
pub(crate) unsafe fn build_definition(
    service: &ITaskService,
    definition: &Definition,
) -> Result<ITaskDefinition, DomainError> {
    let native = service
        .NewTask(0)
        .map_err(|e| com_error("ITaskService::NewTask", e))?;

    if !definition.data.is_empty() {
        native
            .SetData(&bstr(&definition.data))
            .map_err(|e| com_error("SetData", e))?;
    }

    let info = native
        .RegistrationInfo()
        .map_err(|e| com_error("ITaskDefinition::RegistrationInfo", e))?;
    write_registration_info(&info, &definition.registration_info)?;

    let principal = native
        .Principal()
        .map_err(|e| com_error("ITaskDefinition::Principal", e))?;
    write_principal(&principal, &definition.principal)?;

    let settings = native
        .Settings()
        .map_err(|e| com_error("ITaskDefinition::Settings", e))?;
    write_settings(&settings, &definition.settings)?;

    let triggers = native
        .Triggers()
        .map_err(|e| com_error("ITaskDefinition::Triggers", e))?;
    for trigger in &definition.triggers {
        write_trigger(&triggers, trigger)?;
    }

    let actions = native
        .Actions()
        .map_err(|e| com_error("ITaskDefinition::Actions", e))?;
    if !definition.context.is_empty() {
        actions
            .SetContext(&bstr(&definition.context))
            .map_err(|e| com_error("SetContext", e))?;
    }
    for action in &definition.actions {
        write_action(&actions, action)?;
    }

    Ok(native)
}

/// 親フォルダ経由で登録する。検証のみの場合は None。
pub(crate) unsafe fn register(
    service: &ITaskService,
    parent: &ITaskFolder,
    name: &str,
    request: &RegisterRequest,
) -> Result<Option<RegisteredTask>, DomainError> {
    let native = build_definition(service, &request.definition)?;

    let user = variant_str(request.user.as_deref());
    let password = variant_str(request.password.as_deref());
    let sddl = variant_str(request.sddl.as_deref());
    debug!(
        name,
        flags = request.flags.bits(),
        logon = request.logon_type.as_str(),
        "RegisterTaskDefinition"
    );

    let result = parent.RegisterTaskDefinition(
        &bstr(name),
        &native,
        request.flags.bits(),
        &user,
        &password,
        TASK_LOGON_TYPE(request.logon_type.as_i32()),
        &sddl,
    );

    match result {
        Ok(task) => Ok(Some(read_registered_task(&task)?)),
        // 検証のみでは S_OK のまま NULL が返り、空のエラーになる
        Err(e) if crate::validated_without_task(e.code().0, request.flags) => Ok(None),
        Err(e) => Err(com_error("ITaskFolder::RegisterTaskDefinition", e)),
    }
}

unsafe fn write_registration_info(
    info: &IRegistrationInfo,
    value: &RegistrationInfo,
) -> Result<(), DomainError> {
    set_str!(info, SetAuthor, value.author);
    set_str!(info, SetDate, value.date);
    set_str!(info, SetDescription, value.description);
    set_str!(info, SetDocumentation, value.documentation);
    set_str!(info, SetSource, value.source);
    set_str!(info, SetURI, value.uri);
    set_str!(info, SetVersion, value.version);
    if !value.security_descriptor.is_empty() {
        let sddl = VARIANT::from(bstr(&value.security_descriptor));
        info.SetSecurityDescriptor(&sddl)
            .map_err(|e| com_error("SetSecurityDescriptor", e))?;
    }
    Ok(())
}

unsafe fn write_principal(principal: &IPrincipal, value: &Principal) -> Result<(), DomainError> {
    set_str!(principal, SetId, value.id);
    set_str!(principal, SetDisplayName, value.display_name);
    set_str!(principal, SetUserId, value.user_id);
    set_str!(principal, SetGroupId, value.group_id);
    principal
        .SetLogonType(TASK_LOGON_TYPE(value.logon_type.as_i32()))
        .map_err(|e| com_error("SetLogonType", e))?;
    principal
        .SetRunLevel(TASK_RUNLEVEL_TYPE(value.run_level.as_i32()))
        .map_err(|e| com_error("SetRunLevel", e))?;
    Ok(())
}

unsafe fn write_settings(settings: &ITaskSettings, value: &TaskSettings) -> Result<(), DomainError> {
    set_bool!(settings, SetAllowDemandStart, value.allow_demand_start);
    set_bool!(settings, SetAllowHardTerminate, value.allow_hard_terminate);
    settings
        .SetCompatibility(TASK_COMPATIBILITY(value.compatibility.as_i32()))
        .map_err(|e| com_error("SetCompatibility", e))?;
    set_str!(settings, SetDeleteExpiredTaskAfter, value.delete_expired_task_after);
    set_bool!(settings, SetDisallowStartIfOnBatteries, value.disallow_start_if_on_batteries);
    set_bool!(settings, SetEnabled, value.enabled);
    set_str!(settings, SetExecutionTimeLimit, value.execution_time_limit);
    set_bool!(settings, SetHidden, value.hidden);
    settings
        .SetMultipleInstances(TASK_INSTANCES_POLICY(value.multiple_instances.as_i32()))
        .map_err(|e| com_error("SetMultipleInstances", e))?;
    settings
        .SetPriority(value.priority)
        .map_err(|e| com_error("SetPriority", e))?;
    settings
        .SetRestartCount(value.restart_count)
        .map_err(|e| com_error("SetRestartCount", e))?;
    set_str!(settings, SetRestartInterval, value.restart_interval);
    set_bool!(settings, SetRunOnlyIfIdle, value.run_only_if_idle);
    set_bool!(settings, SetRunOnlyIfNetworkAvailable, value.run_only_if_network_available);
    set_bool!(settings, SetStartWhenAvailable, value.start_when_available);
    set_bool!(settings, SetStopIfGoingOnBatteries, value.stop_if_going_on_batteries);
    set_bool!(settings, SetWakeToRun, value.wake_to_run);

    if value.idle_settings != IdleSettings::default() {
        let idle = settings
            .IdleSettings()
            .map_err(|e| com_error("ITaskSettings::IdleSettings", e))?;
        let v = &value.idle_settings;
        set_str!(idle, SetIdleDuration, v.idle_duration);
        set_bool!(idle, SetRestartOnIdle, v.restart_on_idle);
        set_bool!(idle, SetStopOnIdleEnd, v.stop_on_idle_end);
        set_str!(idle, SetWaitTimeout, v.wait_timeout);
    }
    if value.network_settings != NetworkSettings::default() {
        let network = settings
            .NetworkSettings()
            .map_err(|e| com_error("ITaskSettings::NetworkSettings", e))?;
        set_str!(network, SetId, value.network_settings.id);
        set_str!(network, SetName, value.network_settings.name);
    }
    Ok(())
}

unsafe fn write_repetition(trigger: &ITrigger, value: &RepetitionPattern) -> Result<(), DomainError> {
    if !value.is_set() {
        return Ok(());
    }
    let pattern = trigger
        .Repetition()
        .map_err(|e| com_error("ITrigger::Repetition", e))?;
    set_str!(pattern, SetDuration, value.duration);
    set_str!(pattern, SetInterval, value.interval);
    set_bool!(pattern, SetStopAtDurationEnd, value.stop_at_duration_end);
    Ok(())
}

unsafe fn write_trigger_base(trigger: &ITrigger, base: &TaskTrigger) -> Result<(), DomainError> {
    set_bool!(trigger, SetEnabled, base.enabled);
    set_str!(trigger, SetEndBoundary, base.end_boundary);
    set_str!(trigger, SetExecutionTimeLimit, base.execution_time_limit);
    set_str!(trigger, SetId, base.id);
    set_str!(trigger, SetStartBoundary, base.start_boundary);
    write_repetition(trigger, &base.repetition)
}

unsafe fn write_trigger(triggers: &ITriggerCollection, value: &Trigger) -> Result<(), DomainError> {
    let trigger = triggers
        .Create(TASK_TRIGGER_TYPE2(value.type_code()))
        .map_err(|e| com_error("ITriggerCollection::Create", e))?;
    write_trigger_base(&trigger, value.base())?;

    match value {
        Trigger::Event(v) => {
            let t: IEventTrigger = cast(&trigger, "IEventTrigger")?;
            set_str!(t, SetDelay, v.delay);
            set_str!(t, SetSubscription, v.subscription);
            if !v.value_queries.is_empty() {
                let queries = t
                    .ValueQueries()
                    .map_err(|e| com_error("IEventTrigger::ValueQueries", e))?;
                for (name, query) in &v.value_queries {
                    queries
                        .Create(&bstr(name), &bstr(query))
                        .map_err(|e| com_error("ITaskNamedValueCollection::Create", e))?;
                }
            }
        }
        Trigger::Time(v) => {
            let t: ITimeTrigger = cast(&trigger, "ITimeTrigger")?;
            set_str!(t, SetRandomDelay, v.random_delay);
        }
        Trigger::Daily(v) => {
            let t: IDailyTrigger = cast(&trigger, "IDailyTrigger")?;
            t.SetDaysInterval(v.days_interval)
                .map_err(|e| com_error("SetDaysInterval", e))?;
            set_str!(t, SetRandomDelay, v.random_delay);
        }
        Trigger::Weekly(v) => {
            let t: IWeeklyTrigger = cast(&trigger, "IWeeklyTrigger")?;
            t.SetDaysOfWeek(v.days_of_week.bits())
                .map_err(|e| com_error("SetDaysOfWeek", e))?;
            t.SetWeeksInterval(v.weeks_interval)
                .map_err(|e| com_error("SetWeeksInterval", e))?;
            set_str!(t, SetRandomDelay, v.random_delay);
        }
        Trigger::Monthly(v) => {
            let t: IMonthlyTrigger = cast(&trigger, "IMonthlyTrigger")?;
            t.SetDaysOfMonth(v.days_of_month.bits())
                .map_err(|e| com_error("SetDaysOfMonth", e))?;
            t.SetMonthsOfYear(v.months_of_year.bits())
                .map_err(|e| com_error("SetMonthsOfYear", e))?;
            set_bool!(t, SetRunOnLastDayOfMonth, v.run_on_last_day_of_month);
            set_str!(t, SetRandomDelay, v.random_delay);
        }
        Trigger::MonthlyDow(v) => {
            let t: IMonthlyDOWTrigger = cast(&trigger, "IMonthlyDOWTrigger")?;
            t.SetDaysOfWeek(v.days_of_week.bits())
                .map_err(|e| com_error("SetDaysOfWeek", e))?;
            t.SetWeeksOfMonth(v.weeks_of_month.bits())
                .map_err(|e| com_error("SetWeeksOfMonth", e))?;
            t.SetMonthsOfYear(v.months_of_year.bits())
                .map_err(|e| com_error("SetMonthsOfYear", e))?;
            set_bool!(t, SetRunOnLastWeekOfMonth, v.run_on_last_week_of_month);
            set_str!(t, SetRandomDelay, v.random_delay);
        }
        Trigger::Idle(_) | Trigger::Custom(_) => {}
        Trigger::Registration(v) => {
            let t: IRegistrationTrigger = cast(&trigger, "IRegistrationTrigger")?;
            set_str!(t, SetDelay, v.delay);
        }
        Trigger::Boot(v) => {
            let t: IBootTrigger = cast(&trigger, "IBootTrigger")?;
            set_str!(t, SetDelay, v.delay);
        }
        Trigger::Logon(v) => {
            let t: ILogonTrigger = cast(&trigger, "ILogonTrigger")?;
            set_str!(t, SetDelay, v.delay);
            set_str!(t, SetUserId, v.user_id);
        }
        Trigger::SessionStateChange(v) => {
            let t: ISessionStateChangeTrigger = cast(&trigger, "ISessionStateChangeTrigger")?;
            set_str!(t, SetDelay, v.delay);
            set_str!(t, SetUserId, v.user_id);
            t.SetStateChange(TASK_SESSION_STATE_CHANGE_TYPE(v.state_change.as_i32()))
                .map_err(|e| com_error("SetStateChange", e))?;
        }
    }
    Ok(())
}

unsafe fn write_action(actions: &IActionCollection, value: &Action) -> Result<(), DomainError> {
    let action = actions
        .Create(TASK_ACTION_TYPE(value.type_code()))
        .map_err(|e| com_error("IActionCollection::Create", e))?;
    set_str!(action, SetId, value.id());

    match value {
        Action::Exec(v) => {
            let a: IExecAction = cast(&action, "IExecAction")?;
            set_str!(a, SetPath, v.path);
            set_str!(a, SetArguments, v.args);
            set_str!(a, SetWorkingDirectory, v.working_dir);
        }
        Action::ComHandler(v) => {
            let a: IComHandlerAction = cast(&action, "IComHandlerAction")?;
            set_str!(a, SetClassId, v.class_id);
            set_str!(a, SetData, v.data);
        }
        Action::SendEmail(v) => {
            let a: IEmailAction = cast(&action, "IEmailAction")?;
            set_str!(a, SetServer, v.server);
            set_str!(a, SetSubject, v.subject);
            set_str!(a, SetTo, v.to);
            set_str!(a, SetCc, v.cc);
            set_str!(a, SetBcc, v.bcc);
            set_str!(a, SetReplyTo, v.reply_to);
            set_str!(a, SetFrom, v.from);
            set_str!(a, SetBody, v.body);
        }
        Action::ShowMessage(v) => {
            let a: IShowMessageAction = cast(&action, "IShowMessageAction")?;
            set_str!(a, SetTitle, v.title);
            set_str!(a, SetMessageBody, v.message);
        }
    }
    Ok(())
}
