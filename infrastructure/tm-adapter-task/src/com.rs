//! COM セッション管理と共通ヘルパー（Windows のみ）

use tm_domain::model::ConnectionConfig;
use tm_domain::DomainError;
use tracing::debug;
use windows::core::{Interface, BSTR, VARIANT};
use windows::Win32::Foundation::{
    RPC_E_CHANGED_MODE, S_FALSE, S_OK, VARIANT_BOOL, VARIANT_FALSE, VARIANT_TRUE,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_INPROC_SERVER, COINIT_MULTITHREADED,
};
use windows::Win32::System::TaskScheduler::{
    ITaskFolder, ITaskService, TaskScheduler as TASKSERVICE_CLSID,
};

pub(crate) fn com_error(context: &str, err: windows::core::Error) -> DomainError {
    DomainError::from_hresult(context, err.code().0 as u32, err.message().to_string())
}

/// 派生インターフェースへキャストする
pub(crate) fn cast<T: Interface>(obj: &impl Interface, name: &str) -> Result<T, DomainError> {
    obj.cast::<T>()
        .map_err(|e| com_error(&format!("cast to {name}"), e))
}

pub(crate) fn bstr(value: &str) -> BSTR {
    BSTR::from(value)
}

pub(crate) fn variant_bool(value: bool) -> VARIANT_BOOL {
    if value {
        VARIANT_TRUE
    } else {
        VARIANT_FALSE
    }
}

/// `[out]` 引数で値を返すプロパティを読む。失敗時は既定値。
pub(crate) fn out<T: Default>(f: impl FnOnce(*mut T) -> windows::core::Result<()>) -> T {
    let mut value = T::default();
    let ptr: *mut T = &mut value;
    if let Err(e) = f(ptr) {
        debug!(hresult = format!("0x{:08x}", e.code().0 as u32), "property read failed");
    }
    value
}

pub(crate) fn out_string(f: impl FnOnce(*mut BSTR) -> windows::core::Result<()>) -> String {
    out(f).to_string()
}

pub(crate) fn out_bool(f: impl FnOnce(*mut VARIANT_BOOL) -> windows::core::Result<()>) -> bool {
    out(f) != VARIANT_FALSE
}

/// 文字列の VARIANT。空文字/None は VT_EMPTY
pub(crate) fn variant_str(value: Option<&str>) -> VARIANT {
    match value {
        Some(v) if !v.is_empty() => VARIANT::from(bstr(v)),
        _ => VARIANT::new(),
    }
}

/// COM 初期化・接続を行い、サービスとルートフォルダを渡す
pub(crate) fn with_task_service<T, F>(connection: &ConnectionConfig, f: F) -> Result<T, DomainError>
where
    F: FnOnce(&ITaskService, &ITaskFolder) -> Result<T, DomainError>,
{
    unsafe {
        let hr = CoInitializeEx(None, COINIT_MULTITHREADED);
        let did_init = if hr == S_OK || hr == S_FALSE {
            true
        } else if hr == RPC_E_CHANGED_MODE {
            // 既に別モデルで初期化済み。この場合はUninitializeしない。
            false
        } else {
            return Err(DomainError::ComInitFailed(format!(
                "CoInitializeEx: 0x{:08x}",
                hr.0 as u32
            )));
        };

        struct CoUninit(bool);
        impl Drop for CoUninit {
            fn drop(&mut self) {
                if self.0 {
                    unsafe { CoUninitialize() }
                }
            }
        }
        let _guard = CoUninit(did_init);

        let service: ITaskService = CoCreateInstance(&TASKSERVICE_CLSID, None, CLSCTX_INPROC_SERVER)
            .map_err(|e| DomainError::ConnectFailed(format!("CoCreateInstance(TaskScheduler): {}", e.message())))?;

        let server = variant_str(connection.server.as_deref());
        let user = variant_str(connection.user.as_deref());
        let domain = variant_str(connection.domain.as_deref());
        let password = variant_str(connection.password.as_deref());
        debug!(server = ?connection.server, user = ?connection.user, "connecting to task service");
        service
            .Connect(&server, &user, &domain, &password)
            .map_err(|e| match com_error("ITaskService::Connect", e) {
                DomainError::NativeCall { message, hresult, .. } => {
                    DomainError::ConnectFailed(format!("0x{hresult:08x}: {message}"))
                }
                other => other,
            })?;

        let root = service
            .GetFolder(&bstr("\\"))
            .map_err(|e| com_error("GetFolder(\\)", e))?;

        f(&service, &root)
    }
}
