//! ネイティブオブジェクト → カタログ型

use crate::com::{cast, com_error, out, out_bool, out_string};
use std::collections::BTreeMap;
use tm_domain::model::{
    Action, ActionType, BootTrigger, ComHandlerAction, Compatibility, CustomTrigger, DailyTrigger,
    DaysOfMonth, DaysOfWeek, Definition, EmailAction, EventTrigger, ExecAction, IdleSettings,
    IdleTrigger, InstancesPolicy, LogonTrigger, LogonType, MessageAction, MonthlyDowTrigger,
    MonthlyTrigger, MonthsOfYear, NetworkSettings, OleDate, Principal, RegisteredTask,
    RegistrationInfo, RegistrationTrigger, RepetitionPattern, RunLevel, RunningTask,
    ServiceInfo, SessionStateChange, SessionStateChangeTrigger, TaskAction, TaskFolder,
    TaskSettings, TaskState, TaskTrigger, TimeTrigger, Trigger, TriggerType, WeeklyTrigger,
    WeeksOfMonth, TASK_ENUM_HIDDEN,
};
use tm_domain::DomainError;
use windows::core::{BSTR, VARIANT};
use windows::Win32::Foundation::VARIANT_FALSE;
use windows::Win32::System::TaskScheduler::{
    IAction, IBootTrigger, IComHandlerAction, IDailyTrigger, IEmailAction, IEventTrigger,
    IExecAction, ILogonTrigger, IMonthlyDOWTrigger, IMonthlyTrigger, IPrincipal, IRegisteredTask,
    IRegistrationInfo, IRegistrationTrigger, IRunningTask, ISessionStateChangeTrigger,
    IShowMessageAction, ITaskDefinition, ITaskFolder, ITaskNamedValueCollection, ITaskService,
    ITaskSettings, ITimeTrigger, ITrigger, IWeeklyTrigger, TASK_ACTION_TYPE, TASK_COMPATIBILITY,
    TASK_INSTANCES_POLICY, TASK_LOGON_TYPE, TASK_RUNLEVEL_TYPE, TASK_SESSION_STATE_CHANGE_TYPE,
    TASK_TRIGGER_TYPE2,
};

pub(crate) unsafe fn read_service_info(service: &ITaskService) -> ServiceInfo {
    ServiceInfo {
        target_server: service.TargetServer().map(|s| s.to_string()).unwrap_or_default(),
        connected_user: service.ConnectedUser().map(|s| s.to_string()).unwrap_or_default(),
        connected_domain: service.ConnectedDomain().map(|s| s.to_string()).unwrap_or_default(),
        highest_version: service.HighestVersion().unwrap_or_default(),
    }
}

/// フォルダを子孫ごと読む
pub(crate) unsafe fn read_folder(folder: &ITaskFolder, include_hidden: bool) -> Result<TaskFolder, DomainError> {
    let name = folder
        .Name()
        .map_err(|e| com_error("ITaskFolder::Name", e))?
        .to_string();
    let path = folder
        .Path()
        .map_err(|e| com_error("ITaskFolder::Path", e))?
        .to_string();

    let flags = if include_hidden { TASK_ENUM_HIDDEN } else { 0 };
    let tasks = folder
        .GetTasks(flags)
        .map_err(|e| com_error("ITaskFolder::GetTasks", e))?;
    let count = tasks.Count().map_err(|e| com_error("IRegisteredTaskCollection::Count", e))?;
    let mut registered_tasks = Vec::with_capacity(count.max(0) as usize);
    for i in 1..=count {
        let task = tasks
            .get_Item(&VARIANT::from(i))
            .map_err(|e| com_error("IRegisteredTaskCollection::Item", e))?;
        registered_tasks.push(read_registered_task(&task)?);
    }

    let folders = folder
        .GetFolders(0)
        .map_err(|e| com_error("ITaskFolder::GetFolders", e))?;
    let count = folders.Count().map_err(|e| com_error("ITaskFolderCollection::Count", e))?;
    let mut sub_folders = Vec::with_capacity(count.max(0) as usize);
    for i in 1..=count {
        let child = folders
            .get_Item(&VARIANT::from(i))
            .map_err(|e| com_error("ITaskFolderCollection::Item", e))?;
        sub_folders.push(read_folder(&child, include_hidden)?);
    }

    Ok(TaskFolder {
        name,
        path,
        sub_folders,
        registered_tasks,
    })
}

pub(crate) unsafe fn read_registered_task(task: &IRegisteredTask) -> Result<RegisteredTask, DomainError> {
    let name = task
        .Name()
        .map_err(|e| com_error("IRegisteredTask::Name", e))?
        .to_string();
    let path = task
        .Path()
        .map_err(|e| com_error("IRegisteredTask::Path", e))?
        .to_string();
    let definition = task
        .Definition()
        .map_err(|e| com_error("IRegisteredTask::Definition", e))?;
    let state = task.State().map(|s| s.0).unwrap_or_default();

    Ok(RegisteredTask {
        definition: read_definition(&definition)?,
        enabled: task.Enabled().map(|v| v != VARIANT_FALSE).unwrap_or(false),
        state: TaskState::from_i32(state).unwrap_or_default(),
        missed_runs: task.NumberOfMissedRuns().unwrap_or_default(),
        next_run_time: task.NextRunTime().ok().and_then(OleDate::from_native),
        last_run_time: task.LastRunTime().ok().and_then(OleDate::from_native),
        last_task_result: task.LastTaskResult().unwrap_or_default(),
        name,
        path,
    })
}

pub(crate) unsafe fn read_running_task(task: &IRunningTask) -> RunningTask {
    let state = task.State().map(|s| s.0).unwrap_or_default();
    RunningTask {
        current_action: task.CurrentAction().map(|s| s.to_string()).unwrap_or_default(),
        engine_pid: task.EnginePID().unwrap_or_default(),
        instance_guid: task.InstanceGuid().map(|s| s.to_string()).unwrap_or_default(),
        name: task.Name().map(|s| s.to_string()).unwrap_or_default(),
        path: task.Path().map(|s| s.to_string()).unwrap_or_default(),
        state: TaskState::from_i32(state).unwrap_or_default(),
    }
}

pub(crate) unsafe fn read_definition(def: &ITaskDefinition) -> Result<Definition, DomainError> {
    let actions = def
        .Actions()
        .map_err(|e| com_error("ITaskDefinition::Actions", e))?;
    let count: i32 = out(|p| actions.Count(p));
    let mut action_list = Vec::with_capacity(count.max(0) as usize);
    for i in 1..=count {
        let action = actions
            .get_Item(i)
            .map_err(|e| com_error("IActionCollection::Item", e))?;
        action_list.push(read_action(&action)?);
    }
    let context = out_string(|p| actions.Context(p));

    let triggers = def
        .Triggers()
        .map_err(|e| com_error("ITaskDefinition::Triggers", e))?;
    let mut count = 0;
    triggers
        .Count(&mut count)
        .map_err(|e| com_error("ITriggerCollection::Count", e))?;
    let mut trigger_list = Vec::with_capacity(count.max(0) as usize);
    for i in 1..=count {
        let trigger = triggers
            .get_Item(i)
            .map_err(|e| com_error("ITriggerCollection::Item", e))?;
        trigger_list.push(read_trigger(&trigger)?);
    }

    let principal = def
        .Principal()
        .map_err(|e| com_error("ITaskDefinition::Principal", e))?;
    let registration_info = def
        .RegistrationInfo()
        .map_err(|e| com_error("ITaskDefinition::RegistrationInfo", e))?;
    let settings = def
        .Settings()
        .map_err(|e| com_error("ITaskDefinition::Settings", e))?;

    Ok(Definition {
        actions: action_list,
        context,
        data: out_string(|p| def.Data(p)),
        principal: read_principal(&principal)?,
        registration_info: read_registration_info(&registration_info),
        settings: read_settings(&settings)?,
        triggers: trigger_list,
        xml_text: out_string(|p| def.XmlText(p)),
    })
}

unsafe fn read_action(action: &IAction) -> Result<Action, DomainError> {
    let base = TaskAction {
        id: out_string(|p| action.Id(p)),
    };
    let kind: TASK_ACTION_TYPE = out(|p| action.Type(p));

    let action = match ActionType::try_from_i32(kind.0)? {
        ActionType::Exec => {
            let exec: IExecAction = cast(action, "IExecAction")?;
            Action::Exec(ExecAction {
                base,
                path: out_string(|p| exec.Path(p)),
                args: out_string(|p| exec.Arguments(p)),
                working_dir: out_string(|p| exec.WorkingDirectory(p)),
            })
        }
        ActionType::ComHandler => {
            let handler: IComHandlerAction = cast(action, "IComHandlerAction")?;
            Action::ComHandler(ComHandlerAction {
                base,
                class_id: out_string(|p| handler.ClassId(p)),
                data: out_string(|p| handler.Data(p)),
            })
        }
        ActionType::SendEmail => {
            let mail: IEmailAction = cast(action, "IEmailAction")?;
            Action::SendEmail(EmailAction {
                base,
                server: out_string(|p| mail.Server(p)),
                subject: out_string(|p| mail.Subject(p)),
                to: out_string(|p| mail.To(p)),
                cc: out_string(|p| mail.Cc(p)),
                bcc: out_string(|p| mail.Bcc(p)),
                reply_to: out_string(|p| mail.ReplyTo(p)),
                from: out_string(|p| mail.From(p)),
                body: out_string(|p| mail.Body(p)),
            })
        }
        ActionType::ShowMessage => {
            let message: IShowMessageAction = cast(action, "IShowMessageAction")?;
            Action::ShowMessage(MessageAction {
                base,
                title: out_string(|p| message.Title(p)),
                message: out_string(|p| message.MessageBody(p)),
            })
        }
    };
    Ok(action)
}

unsafe fn read_repetition(trigger: &ITrigger) -> RepetitionPattern {
    match trigger.Repetition() {
        Ok(pattern) => RepetitionPattern {
            duration: out_string(|p| pattern.Duration(p)),
            interval: out_string(|p| pattern.Interval(p)),
            stop_at_duration_end: out_bool(|p| pattern.StopAtDurationEnd(p)),
        },
        Err(_) => RepetitionPattern::default(),
    }
}

unsafe fn read_trigger(trigger: &ITrigger) -> Result<Trigger, DomainError> {
    let base = TaskTrigger {
        enabled: out_bool(|p| trigger.Enabled(p)),
        end_boundary: out_string(|p| trigger.EndBoundary(p)),
        execution_time_limit: out_string(|p| trigger.ExecutionTimeLimit(p)),
        id: out_string(|p| trigger.Id(p)),
        repetition: read_repetition(trigger),
        start_boundary: out_string(|p| trigger.StartBoundary(p)),
    };
    let kind: TASK_TRIGGER_TYPE2 = out(|p| trigger.Type(p));

    let trigger = match TriggerType::try_from_i32(kind.0)? {
        TriggerType::Event => {
            let t: IEventTrigger = cast(trigger, "IEventTrigger")?;
            Trigger::Event(EventTrigger {
                base,
                delay: out_string(|p| t.Delay(p)),
                subscription: out_string(|p| t.Subscription(p)),
                value_queries: match t.ValueQueries() {
                    Ok(queries) => read_named_values(&queries)?,
                    Err(_) => BTreeMap::new(),
                },
            })
        }
        TriggerType::Time => {
            let t: ITimeTrigger = cast(trigger, "ITimeTrigger")?;
            Trigger::Time(TimeTrigger {
                base,
                random_delay: out_string(|p| t.RandomDelay(p)),
            })
        }
        TriggerType::Daily => {
            let t: IDailyTrigger = cast(trigger, "IDailyTrigger")?;
            Trigger::Daily(DailyTrigger {
                base,
                days_interval: out(|p| t.DaysInterval(p)),
                random_delay: out_string(|p| t.RandomDelay(p)),
            })
        }
        TriggerType::Weekly => {
            let t: IWeeklyTrigger = cast(trigger, "IWeeklyTrigger")?;
            Trigger::Weekly(WeeklyTrigger {
                base,
                days_of_week: DaysOfWeek::from_bits(out(|p| t.DaysOfWeek(p))),
                weeks_interval: out(|p| t.WeeksInterval(p)),
                random_delay: out_string(|p| t.RandomDelay(p)),
            })
        }
        TriggerType::Monthly => {
            let t: IMonthlyTrigger = cast(trigger, "IMonthlyTrigger")?;
            Trigger::Monthly(MonthlyTrigger {
                base,
                days_of_month: DaysOfMonth::from_bits(out(|p| t.DaysOfMonth(p))),
                months_of_year: MonthsOfYear::from_bits(out(|p| t.MonthsOfYear(p))),
                run_on_last_day_of_month: out_bool(|p| t.RunOnLastDayOfMonth(p)),
                random_delay: out_string(|p| t.RandomDelay(p)),
            })
        }
        TriggerType::MonthlyDow => {
            let t: IMonthlyDOWTrigger = cast(trigger, "IMonthlyDOWTrigger")?;
            Trigger::MonthlyDow(MonthlyDowTrigger {
                base,
                days_of_week: DaysOfWeek::from_bits(out(|p| t.DaysOfWeek(p))),
                weeks_of_month: WeeksOfMonth::from_bits(out(|p| t.WeeksOfMonth(p))),
                months_of_year: MonthsOfYear::from_bits(out(|p| t.MonthsOfYear(p))),
                run_on_last_week_of_month: out_bool(|p| t.RunOnLastWeekOfMonth(p)),
                random_delay: out_string(|p| t.RandomDelay(p)),
            })
        }
        TriggerType::Idle => Trigger::Idle(IdleTrigger { base }),
        TriggerType::Registration => {
            let t: IRegistrationTrigger = cast(trigger, "IRegistrationTrigger")?;
            Trigger::Registration(RegistrationTrigger {
                base,
                delay: out_string(|p| t.Delay(p)),
            })
        }
        TriggerType::Boot => {
            let t: IBootTrigger = cast(trigger, "IBootTrigger")?;
            Trigger::Boot(BootTrigger {
                base,
                delay: out_string(|p| t.Delay(p)),
            })
        }
        TriggerType::Logon => {
            let t: ILogonTrigger = cast(trigger, "ILogonTrigger")?;
            Trigger::Logon(LogonTrigger {
                base,
                delay: out_string(|p| t.Delay(p)),
                user_id: out_string(|p| t.UserId(p)),
            })
        }
        TriggerType::SessionStateChange => {
            let t: ISessionStateChangeTrigger = cast(trigger, "ISessionStateChangeTrigger")?;
            let change: TASK_SESSION_STATE_CHANGE_TYPE = out(|p| t.StateChange(p));
            Trigger::SessionStateChange(SessionStateChangeTrigger {
                base,
                delay: out_string(|p| t.Delay(p)),
                state_change: SessionStateChange::try_from_i32(change.0)?,
                user_id: out_string(|p| t.UserId(p)),
            })
        }
        TriggerType::Custom => Trigger::Custom(CustomTrigger { base }),
    };
    Ok(trigger)
}

unsafe fn read_named_values(values: &ITaskNamedValueCollection) -> Result<BTreeMap<String, String>, DomainError> {
    let mut count = 0;
    values
        .Count(&mut count)
        .map_err(|e| com_error("ITaskNamedValueCollection::Count", e))?;
    let mut map = BTreeMap::new();
    for i in 1..=count {
        let pair = values
            .get_Item(i)
            .map_err(|e| com_error("ITaskNamedValueCollection::Item", e))?;
        let name: BSTR = out(|p| pair.Name(p));
        let value: BSTR = out(|p| pair.Value(p));
        map.insert(name.to_string(), value.to_string());
    }
    Ok(map)
}

unsafe fn read_principal(principal: &IPrincipal) -> Result<Principal, DomainError> {
    let logon: TASK_LOGON_TYPE = out(|p| principal.LogonType(p));
    let run_level: TASK_RUNLEVEL_TYPE = out(|p| principal.RunLevel(p));
    Ok(Principal {
        display_name: out_string(|p| principal.DisplayName(p)),
        group_id: out_string(|p| principal.GroupId(p)),
        id: out_string(|p| principal.Id(p)),
        logon_type: LogonType::try_from_i32(logon.0)?,
        run_level: RunLevel::try_from_i32(run_level.0)?,
        user_id: out_string(|p| principal.UserId(p)),
    })
}

unsafe fn read_registration_info(info: &IRegistrationInfo) -> RegistrationInfo {
    let sddl: VARIANT = out(|p| info.SecurityDescriptor(p));
    RegistrationInfo {
        author: out_string(|p| info.Author(p)),
        date: out_string(|p| info.Date(p)),
        description: out_string(|p| info.Description(p)),
        documentation: out_string(|p| info.Documentation(p)),
        security_descriptor: sddl.to_string(),
        source: out_string(|p| info.Source(p)),
        uri: out_string(|p| info.URI(p)),
        version: out_string(|p| info.Version(p)),
    }
}

unsafe fn read_settings(settings: &ITaskSettings) -> Result<TaskSettings, DomainError> {
    let compatibility: TASK_COMPATIBILITY = out(|p| settings.Compatibility(p));
    let instances: TASK_INSTANCES_POLICY = out(|p| settings.MultipleInstances(p));

    Ok(TaskSettings {
        allow_demand_start: out_bool(|p| settings.AllowDemandStart(p)),
        allow_hard_terminate: out_bool(|p| settings.AllowHardTerminate(p)),
        compatibility: Compatibility::try_from_i32(compatibility.0)?,
        delete_expired_task_after: out_string(|p| settings.DeleteExpiredTaskAfter(p)),
        disallow_start_if_on_batteries: out_bool(|p| settings.DisallowStartIfOnBatteries(p)),
        enabled: out_bool(|p| settings.Enabled(p)),
        execution_time_limit: out_string(|p| settings.ExecutionTimeLimit(p)),
        hidden: out_bool(|p| settings.Hidden(p)),
        idle_settings: match settings.IdleSettings() {
            Ok(idle) => IdleSettings {
                idle_duration: out_string(|p| idle.IdleDuration(p)),
                restart_on_idle: out_bool(|p| idle.RestartOnIdle(p)),
                stop_on_idle_end: out_bool(|p| idle.StopOnIdleEnd(p)),
                wait_timeout: out_string(|p| idle.WaitTimeout(p)),
            },
            Err(_) => IdleSettings::default(),
        },
        multiple_instances: InstancesPolicy::try_from_i32(instances.0)?,
        network_settings: match settings.NetworkSettings() {
            Ok(network) => NetworkSettings {
                id: out_string(|p| network.Id(p)),
                name: out_string(|p| network.Name(p)),
            },
            Err(_) => NetworkSettings::default(),
        },
        priority: out(|p| settings.Priority(p)),
        restart_count: out(|p| settings.RestartCount(p)),
        restart_interval: out_string(|p| settings.RestartInterval(p)),
        run_only_if_idle: out_bool(|p| settings.RunOnlyIfIdle(p)),
        run_only_if_network_available: out_bool(|p| settings.RunOnlyIfNetworkAvailable(p)),
        start_when_available: out_bool(|p| settings.StartWhenAvailable(p)),
        stop_if_going_on_batteries: out_bool(|p| settings.StopIfGoingOnBatteries(p)),
        wake_to_run: out_bool(|p| settings.WakeToRun(p)),
    })
}
